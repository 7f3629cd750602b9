use crate::parser;

/// The property parameters that affect how a value is interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// Purpose: To specify the identifier for the time zone definition for a
    /// time component in the property value.
    ///
    /// Description:  This parameter MUST be specified on the "DTSTART",
    /// "DTEND", "DUE", "EXDATE", and "RDATE" properties when either a DATE-TIME
    /// or TIME value type is specified and when the value is neither a UTC or a
    /// "floating" time.
    ///
    /// We resolve the identifier against the IANA time zone database rather
    /// than evaluating the calendar's own `VTIMEZONE` rules.
    TimeZoneID(String),

    /// Purpose:  To explicitly specify the value type format for a property
    /// value, e.g. `VALUE=DATE` on an all day `DTSTART`.
    ValueDataType(String),

    /// Any parameter that wasn't recognized, by name.
    Other(String),
}

impl From<parser::Parameter> for Parameter {
    fn from(p: parser::Parameter) -> Self {
        let name = p.name.to_ascii_uppercase();

        match (&name as &str, p.values.last()) {
            ("TZID", Some(tzid)) => Parameter::TimeZoneID(tzid.trim_start_matches('/').to_string()),
            ("VALUE", Some(data_type)) => Parameter::ValueDataType(data_type.to_ascii_uppercase()),
            _ => Parameter::Other(name),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    parameters: Vec<Parameter>,
}

impl<I> From<I> for ParameterSet
where
    I: IntoIterator<Item = parser::Parameter>,
{
    fn from(iter: I) -> Self {
        ParameterSet {
            parameters: iter.into_iter().map(Parameter::from).collect(),
        }
    }
}

impl ParameterSet {
    pub fn get_value_data_type(&self) -> Option<&str> {
        self.parameters.iter().find_map(|param| match param {
            Parameter::ValueDataType(data_type) => Some(data_type.as_str()),
            _ => None,
        })
    }

    pub fn get_tzid(&self) -> Option<&str> {
        self.parameters.iter().find_map(|param| match param {
            Parameter::TimeZoneID(tzid) => Some(tzid.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, value: &str) -> parser::Parameter {
        parser::Parameter {
            name: name.to_string(),
            values: vec![value.to_string()],
        }
    }

    #[test]
    fn finds_known_parameters() {
        let set: ParameterSet = vec![
            param("x-custom", "1"),
            param("tzid", "/Europe/London"),
            param("Value", "date"),
        ]
        .into();

        assert_eq!(set.get_tzid(), Some("Europe/London"));
        assert_eq!(set.get_value_data_type(), Some("DATE"));
        assert_eq!(set.parameters[0], Parameter::Other("X-CUSTOM".to_string()));
    }

    #[test]
    fn missing_parameters() {
        let set: ParameterSet = vec![param("x-custom", "1")].into();

        assert_eq!(set.get_tzid(), None);
        assert_eq!(set.get_value_data_type(), None);
    }
}
