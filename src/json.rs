//! JSON construction of [`Opt`] and [`Arg`].
//!
//! Keys are camelCase (`longName`, `shortName`, `multiValued`, `argName`,
//! ...); absent keys take their builder defaults and unknown keys are
//! ignored, so definitions survive additive schema changes.

use serde_json::Value;

use crate::model::{Arg, DefinitionError, Opt};

impl Opt {
    /// Construct an option from a JSON object.
    ///
    /// ### Example
    /// ```
    /// use clidef::Opt;
    ///
    /// let opt = Opt::from_json(r#"{"longName": "color", "shortName": "c"}"#).unwrap();
    /// assert_eq!(opt.long_name(), Some("color"));
    /// assert_eq!(opt.short_name(), Some('c'));
    /// ```
    pub fn from_json(text: &str) -> Result<Self, DefinitionError> {
        serde_json::from_str(text).map_err(|error| DefinitionError::MalformedJson(error.to_string()))
    }

    /// Construct an option from an already-parsed JSON value.
    pub fn from_json_value(value: Value) -> Result<Self, DefinitionError> {
        serde_json::from_value(value)
            .map_err(|error| DefinitionError::MalformedJson(error.to_string()))
    }
}

impl Arg {
    /// Construct an argument from a JSON object.
    pub fn from_json(text: &str) -> Result<Self, DefinitionError> {
        serde_json::from_str(text).map_err(|error| DefinitionError::MalformedJson(error.to_string()))
    }

    /// Construct an argument from an already-parsed JSON value.
    pub fn from_json_value(value: Value) -> Result<Self, DefinitionError> {
        serde_json::from_value(value)
            .map_err(|error| DefinitionError::MalformedJson(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn opt_from_json_full() {
        let opt = Opt::from_json(
            r#"{
                "longName": "color",
                "shortName": "c",
                "description": "The paint color.",
                "multiValued": true,
                "required": true,
                "defaultValue": "green",
                "choices": ["blue", "red", "green"]
            }"#,
        )
        .unwrap();

        assert_eq!(opt.long_name(), Some("color"));
        assert_eq!(opt.short_name(), Some('c'));
        assert_eq!(opt.description_text(), Some("The paint color."));
        assert!(opt.is_multi_valued());
        assert!(opt.is_required());
        assert_eq!(opt.default_text(), Some("green"));
        assert!(opt.choice_set().contains("red"));
    }

    #[test]
    fn opt_from_json_absent_keys_take_defaults() {
        let opt = Opt::from_json(r#"{"longName": "verbose", "flag": true}"#).unwrap();

        assert_eq!(opt.long_name(), Some("verbose"));
        assert_eq!(opt.short_name(), None);
        assert!(opt.is_flag());
        assert!(!opt.is_required());
        assert!(!opt.is_hidden());
    }

    #[test]
    fn opt_from_json_unknown_keys_ignored() {
        let opt = Opt::from_json(r#"{"longName": "verbose", "futureKey": 42}"#).unwrap();

        assert_eq!(opt.long_name(), Some("verbose"));
    }

    #[test]
    fn opt_from_json_malformed() {
        assert_matches!(
            Opt::from_json(r#"{"longName": "#),
            Err(DefinitionError::MalformedJson(_))
        );
    }

    #[test]
    fn opt_from_json_short_name_must_be_one_character() {
        assert_matches!(
            Opt::from_json(r#"{"shortName": "color"}"#),
            Err(DefinitionError::MalformedJson(_))
        );
    }

    #[test]
    fn opt_from_json_value() {
        let opt = Opt::from_json_value(json!({
            "shortName": "D",
            "property": true,
        }))
        .unwrap();

        assert_eq!(opt.short_name(), Some('D'));
        assert!(opt.is_property());
        assert!(opt.is_multi_valued());
    }

    #[test]
    fn arg_from_json_full() {
        let arg = Arg::from_json(
            r#"{
                "argName": "files",
                "index": 1,
                "description": "The input files.",
                "required": true,
                "multiValued": true
            }"#,
        )
        .unwrap();

        assert_eq!(arg.arg_name(), Some("files"));
        assert_eq!(arg.declared_index(), Some(1));
        assert_eq!(arg.description_text(), Some("The input files."));
        assert!(arg.is_required());
        assert!(arg.is_multi_valued());
    }

    #[test]
    fn arg_from_json_absent_keys_take_defaults() {
        let arg = Arg::from_json(r#"{"argName": "source"}"#).unwrap();

        assert_eq!(arg.arg_name(), Some("source"));
        assert_eq!(arg.declared_index(), None);
        assert!(!arg.is_required());
    }

    #[test]
    fn json_definition_end_to_end() {
        let cli = crate::Cli::build("paint")
            .option(Opt::from_json(r#"{"longName": "color", "shortName": "c"}"#).unwrap())
            .argument(Arg::from_json(r#"{"argName": "canvas"}"#).unwrap())
            .build()
            .unwrap();

        let line = cli.parse(["--color", "red", "wall"]).unwrap();

        assert_eq!(line.option_value("color").unwrap(), Some("red"));
        assert_eq!(line.argument_value_by_name("canvas").unwrap(), Some("wall"));
    }
}
