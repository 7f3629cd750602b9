//! Decodes raw iCalendar text into a generic tree of components and
//! properties. Nothing here knows what a `VEVENT` means; see
//! [`crate::components`] for that.

use anyhow::{bail, Context, Error};
use once_cell::sync::Lazy;
use pest::{iterators::Pair, Parser};
use pest_derive::Parser;
use regex::Regex;

static FOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n[\t ]").expect("valid fold regex"));

fn strip_folds(s: &str) -> String {
    FOLD.replace_all(s, "").into_owned()
}

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct CalParser;

#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub sub_components: Vec<Component>,
    pub properties: Vec<Property>,
}

impl Component {
    /// Parse every top level component in `data`.
    pub fn from_str_to_stream(data: &str) -> Result<Vec<Component>, Error> {
        let mut pairs =
            CalParser::parse(Rule::calendar, data).context("parsing iCalendar content lines")?;

        let calendar = pairs.next().context("empty iCalendar stream")?;

        calendar
            .into_inner()
            .filter(|pair| pair.as_rule() == Rule::component)
            .map(Component::from_pair)
            .collect()
    }

    fn from_pair(pair: Pair<Rule>) -> Result<Component, Error> {
        let span = pair.as_span();
        let mut name = None;
        let mut sub_components = Vec::new();
        let mut properties = Vec::new();

        for inner_pair in pair.into_inner() {
            match inner_pair.as_rule() {
                Rule::name => name = Some(strip_folds(inner_pair.as_str())),
                Rule::component => sub_components.push(Component::from_pair(inner_pair)?),
                Rule::property => properties.push(Property::from_pair(inner_pair)?),
                _ => bail!("Unexpected type {:?}", inner_pair.as_rule()),
            }
        }

        if let Some(name) = name {
            Ok(Component {
                name,
                sub_components,
                properties,
            })
        } else {
            bail!("No name for component: {:?}", span.as_str());
        }
    }

    /// Whether the component has the given name, ignoring case.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// All direct sub components with the given name, in document order.
    pub fn sub_components_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Component> + 'a {
        self.sub_components.iter().filter(move |c| c.is(name))
    }
}

#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub value: String,
    pub parameters: Vec<Parameter>,
}

impl Property {
    fn from_pair(pair: Pair<Rule>) -> Result<Property, Error> {
        let span = pair.as_span();
        let mut name = None;
        let mut value = None;
        let mut parameters = Vec::new();

        for inner_pair in pair.into_inner() {
            match inner_pair.as_rule() {
                Rule::name => name = Some(strip_folds(inner_pair.as_str())),
                Rule::property_value => value = Some(strip_folds(inner_pair.as_str())),
                Rule::param => parameters.push(Parameter::from_pair(inner_pair)?),
                _ => bail!("Unexpected type {:?}", inner_pair.as_rule()),
            }
        }

        if let (Some(name), Some(value)) = (name, value) {
            Ok(Property {
                name,
                value,
                parameters,
            })
        } else {
            bail!("No name for property: {:?}", span.as_str());
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub values: Vec<String>,
}

impl Parameter {
    fn from_pair(pair: Pair<Rule>) -> Result<Parameter, Error> {
        let span = pair.as_span();
        let mut name = None;
        let mut values = Vec::new();
        for inner_pair in pair.into_inner() {
            match inner_pair.as_rule() {
                Rule::name => name = Some(strip_folds(inner_pair.as_str())),
                Rule::param_value => values.push(
                    strip_folds(inner_pair.as_str())
                        .trim_matches('"')
                        .to_string(),
                ),
                _ => bail!("Unexpected type {:?}", inner_pair.as_rule()),
            }
        }

        if values.is_empty() {
            bail!("No values for param {:?}", span.as_str());
        }

        if let Some(name) = name {
            Ok(Parameter { name, values })
        } else {
            bail!("No name for parameter: {:?}", span.as_str());
        }
    }
}
