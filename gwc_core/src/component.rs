//! A generic iCalendar component tree and its serializer.
//!
//! Properties are plain [`ical::generator::Property`] values, so the `ical_property!` and
//! `ical_param!` macros can build them. Serialization folds every content line on octet
//! boundaries and terminates it with CRLF.

use ical::generator::{Emitter, Property};

use crate::format::{fold_line, CRLF};

/// A calendar component such as `VCALENDAR`, `VEVENT` or `VALARM`.
#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub properties: Vec<Property>,
    pub components: Vec<Component>,
}

impl Component {
    pub fn new(name: &str) -> Self {
        Component {
            name: String::from(name),
            properties: vec![],
            components: vec![],
        }
    }

    /// Append a property.
    pub fn set(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Append a nested component.
    pub fn with(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// The value of the first property called `name`.
    pub fn property_value(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .and_then(|property| property.value.as_deref())
    }

    /// All nested components called `name`.
    pub fn components_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Component> {
        self.components
            .iter()
            .filter(move |component| component.name == name)
    }
}

impl Emitter for Component {
    fn generate(&self) -> String {
        let mut output = String::new();
        push_line(&mut output, &format!("BEGIN:{}", self.name));
        for property in &self.properties {
            push_line(&mut output, &content_line(property));
        }
        for component in &self.components {
            output.push_str(&component.generate());
        }
        push_line(&mut output, &format!("END:{}", self.name));
        output
    }
}

fn push_line(output: &mut String, line: &str) {
    output.push_str(&fold_line(line));
    output.push_str(CRLF);
}

/// Render one property as an unfolded content line.
fn content_line(property: &Property) -> String {
    let mut line = property.name.clone();
    if let Some(params) = &property.params {
        for (name, values) in params {
            line.push(';');
            line.push_str(name);
            line.push('=');
            let values: Vec<String> = values.iter().map(|value| quote_param(value)).collect();
            line.push_str(&values.join(","));
        }
    }
    line.push(':');
    if let Some(value) = &property.value {
        line.push_str(value);
    }
    line
}

/// Parameter values containing separators must be quoted.
fn quote_param(value: &str) -> String {
    if value.contains([':', ';', ',']) {
        format!("\"{value}\"")
    } else {
        String::from(value)
    }
}
