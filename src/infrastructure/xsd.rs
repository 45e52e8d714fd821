//! ifcXML schema (XSD) reader
//!
//! Entities are the top-level named `complexType`s whose `complexContent`
//! holds an `extension`; the extension base is the supertype. A
//! `PredefinedType` attribute on the extension names the entity's
//! enumeration. Named `simpleType`s ending in `Enum` are enumerations.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, instrument};

use crate::domain::{EntityDecl, ParsedSchema, SchemaParseError};
use crate::infrastructure::traits::SchemaParser;

const PREDEFINED_TYPE_ATTRIBUTE: &str = "PredefinedType";

/// quick-xml backed [`SchemaParser`].
#[derive(Debug, Default, Clone, Copy)]
pub struct XsdSchemaParser;

/// A named top-level complexType that is still open.
struct OpenType {
    decl: EntityDecl,
    /// Element stack length when the complexType started
    depth: usize,
}

impl SchemaParser for XsdSchemaParser {
    #[instrument(level = "debug", skip_all, fields(bytes = source.len()))]
    fn parse(&self, source: &str) -> Result<ParsedSchema, SchemaParseError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<String> = Vec::new();
        let mut open: Option<OpenType> = None;
        let mut entities = Vec::new();
        let mut enumerations = BTreeSet::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = local_name(&e);
                    let top_level = stack.len() == 1 && stack[0] == "schema";
                    match name.as_str() {
                        "complexType" if top_level => {
                            if let Some(type_name) = attribute(&e, "name")? {
                                let mut decl = EntityDecl::new(type_name);
                                decl.is_abstract = is_true(attribute(&e, "abstract")?);
                                open = Some(OpenType {
                                    decl,
                                    depth: stack.len(),
                                });
                            }
                        }
                        "simpleType" if top_level => {
                            if let Some(type_name) = attribute(&e, "name")? {
                                if type_name.ends_with("Enum") {
                                    enumerations.insert(type_name);
                                }
                            }
                        }
                        _ => inspect_content(&e, &name, &stack, open.as_mut())?,
                    }
                    stack.push(name);
                }
                Ok(Event::Empty(e)) => {
                    let name = local_name(&e);
                    inspect_content(&e, &name, &stack, open.as_mut())?;
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                    if open.as_ref().is_some_and(|t| t.depth == stack.len()) {
                        if let Some(finished) = open.take() {
                            if finished.decl.supertype.is_some() {
                                entities.push(finished.decl);
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(xml_error(format_args!(
                        "at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
        }

        // The PredefinedType attribute type already names its enumeration, so
        // each declared enum maps to itself.
        let predefined_type_enums: BTreeMap<String, String> = entities
            .iter()
            .filter_map(|d: &EntityDecl| d.predefined_type.as_ref())
            .filter(|pdt| enumerations.contains(pdt.as_str()))
            .map(|pdt| (pdt.clone(), pdt.clone()))
            .collect();

        debug!(
            "parsed {} entities, {} enumerations",
            entities.len(),
            enumerations.len()
        );
        Ok(ParsedSchema {
            entities,
            predefined_type_enums,
        })
    }
}

/// Pick up `extension base` and the `PredefinedType` attribute of the open
/// complexType.
fn inspect_content(
    e: &BytesStart<'_>,
    name: &str,
    stack: &[String],
    open: Option<&mut OpenType>,
) -> Result<(), SchemaParseError> {
    let Some(open) = open else {
        return Ok(());
    };
    let relative = &stack[open.depth..];
    match (name, relative) {
        ("extension", [complex_type, complex_content])
            if complex_type == "complexType" && complex_content == "complexContent" =>
        {
            if let Some(base) = attribute(e, "base")? {
                open.decl.supertype = Some(strip_prefix(&base).to_string());
            }
        }
        ("attribute", [_, _, extension]) if extension == "extension" => {
            if attribute(e, "name")?.as_deref() == Some(PREDEFINED_TYPE_ATTRIBUTE) {
                if let Some(ty) = attribute(e, "type")? {
                    open.decl.predefined_type = Some(strip_prefix(&ty).to_string());
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>, SchemaParseError> {
    match e.try_get_attribute(key) {
        Ok(Some(attr)) => attr
            .unescape_value()
            .map(|v| Some(v.into_owned()))
            .map_err(xml_error),
        Ok(None) => Ok(None),
        Err(err) => Err(xml_error(err)),
    }
}

fn is_true(value: Option<String>) -> bool {
    matches!(value.as_deref(), Some("true") | Some("1"))
}

/// `ifc:IfcWall` -> `IfcWall`
fn strip_prefix(qualified: &str) -> &str {
    qualified
        .rsplit_once(':')
        .map(|(_, local)| local)
        .unwrap_or(qualified)
}

fn xml_error(err: impl fmt::Display) -> SchemaParseError {
    SchemaParseError {
        message: format!("invalid schema XML {}", err),
    }
}
