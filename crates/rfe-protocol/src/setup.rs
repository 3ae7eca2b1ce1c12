//! Device setup reports
//!
//! A `SetupInfo` line announces which radio modules a unit carries and
//! its firmware version. Spectrum analyzers send it with the `#C2-M:`
//! prefix, signal generators with `#C3-M:`; the model-code type differs
//! per family, so the message is generic over it.

use std::fmt::Debug;

use crate::error::ParseError;
use crate::frame::Fields;

/// One of the up-to-two physical radio front-ends a unit may carry
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RadioModule<M> {
    Main { model: M },
    Expansion { model: M },
}

impl<M: Copy> RadioModule<M> {
    pub fn model(&self) -> M {
        match self {
            Self::Main { model } => *model,
            Self::Expansion { model } => *model,
        }
    }

    pub fn is_main(&self) -> bool {
        matches!(self, Self::Main { .. })
    }

    pub fn is_expansion(&self) -> bool {
        !self.is_main()
    }
}

/// Model lineup and firmware version reported during the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupInfo<M> {
    pub main_radio_module: RadioModule<M>,
    /// Absent on single-module units (wire code 255)
    pub expansion_radio_module: Option<RadioModule<M>>,
    pub firmware_version: String,
}

/// Wire code meaning "no expansion module installed"
const NO_EXPANSION_MODULE: u8 = 255;

impl<M: Debug + Copy + TryFrom<u8>> SetupInfo<M> {
    pub(crate) fn parse_body(body: &str) -> Result<Self, ParseError> {
        let mut fields = Fields::new(body);

        let main_code: u8 = fields.num()?;
        let main_model = M::try_from(main_code)
            .map_err(|_| ParseError::InvalidValue(main_code, "main model"))?;

        let exp_code: u8 = fields.num()?;
        let expansion_model = if exp_code == NO_EXPANSION_MODULE {
            None
        } else {
            Some(
                M::try_from(exp_code)
                    .map_err(|_| ParseError::InvalidValue(exp_code, "expansion model"))?,
            )
        };

        let firmware_version = fields.next()?.to_string();

        Ok(SetupInfo {
            main_radio_module: RadioModule::Main { model: main_model },
            expansion_radio_module: expansion_model
                .map(|model| RadioModule::Expansion { model }),
            firmware_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::Model;

    #[test]
    fn test_parse_setup_without_expansion() {
        let setup = SetupInfo::<Model>::parse_body("005,255,01.12B26").unwrap();
        assert_eq!(setup.main_radio_module.model(), Model::RfeWSub3G);
        assert!(setup.expansion_radio_module.is_none());
        assert_eq!(setup.firmware_version, "01.12B26");
    }

    #[test]
    fn test_parse_setup_with_expansion() {
        let setup = SetupInfo::<Model>::parse_body("006,004,01.26B4").unwrap();
        assert_eq!(setup.main_radio_module.model(), Model::Rfe6G);
        let expansion = setup.expansion_radio_module.unwrap();
        assert!(expansion.is_expansion());
        assert_eq!(expansion.model(), Model::Rfe24G);
    }

    #[test]
    fn test_unknown_model_code_maps_to_unknown() {
        // Analyzer model codes outside the table parse as Unknown
        // rather than rejecting the whole setup line
        let setup = SetupInfo::<Model>::parse_body("099,255,03.18").unwrap();
        assert_eq!(setup.main_radio_module.model(), Model::Unknown);
    }
}
