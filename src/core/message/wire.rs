//! Wire-format message model
//!
//! A message is an ordered list of segments; a segment is a name plus an
//! ordered list of fields; a field is empty, a single value, or a list of
//! components. Serialization is uniform: segments join their fields with
//! the field delimiter and end with the segment delimiter, and delimiter
//! characters inside values are escaped with the standard HL7 sequences.
//!
//! Absent data serializes as an empty field rather than being omitted, so
//! field positions stay fixed regardless of which optional record fields
//! were present.

/// Segment delimiter, fixed for every EMR target
pub const SEGMENT_DELIMITER: &str = "\r\n";

/// Delimiter characters of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hl7Encoding {
    pub field: char,
    pub component: char,
    pub repetition: char,
    pub escape: char,
    pub subcomponent: char,
}

impl Default for Hl7Encoding {
    fn default() -> Self {
        Self {
            field: '|',
            component: '^',
            repetition: '~',
            escape: '\\',
            subcomponent: '&',
        }
    }
}

impl Hl7Encoding {
    /// The MSH-2 delimiter block (`^~\&` with default delimiters)
    pub fn delimiter_block(&self) -> String {
        let mut block = String::with_capacity(4);
        block.push(self.component);
        block.push(self.repetition);
        block.push(self.escape);
        block.push(self.subcomponent);
        block
    }

    /// Escapes delimiter characters inside a value
    pub fn escape_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            if c == self.escape {
                self.push_escape_sequence(&mut out, 'E');
            } else if c == self.field {
                self.push_escape_sequence(&mut out, 'F');
            } else if c == self.component {
                self.push_escape_sequence(&mut out, 'S');
            } else if c == self.repetition {
                self.push_escape_sequence(&mut out, 'R');
            } else if c == self.subcomponent {
                self.push_escape_sequence(&mut out, 'T');
            } else {
                out.push(c);
            }
        }
        out
    }

    fn push_escape_sequence(&self, out: &mut String, code: char) {
        out.push(self.escape);
        out.push(code);
        out.push(self.escape);
    }
}

/// One field of a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// No value; serializes to nothing but holds its position
    Empty,
    /// Single value, escaped on serialization
    Value(String),
    /// Component list joined by the component delimiter; trailing empty
    /// components are kept
    Composite(Vec<String>),
    /// Emitted verbatim (the MSH delimiter block must not be escaped)
    Raw(String),
}

impl Field {
    pub fn value(value: impl Into<String>) -> Self {
        Field::Value(value.into())
    }

    pub fn composite(parts: Vec<String>) -> Self {
        Field::Composite(parts)
    }

    fn serialize(&self, encoding: &Hl7Encoding) -> String {
        match self {
            Field::Empty => String::new(),
            Field::Value(value) => encoding.escape_text(value),
            Field::Composite(parts) => parts
                .iter()
                .map(|part| encoding.escape_text(part))
                .collect::<Vec<_>>()
                .join(&encoding.component.to_string()),
            Field::Raw(value) => value.clone(),
        }
    }
}

/// One segment of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    name: String,
    fields: Vec<Field>,
}

impl Segment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn push_empty(&mut self) {
        self.fields.push(Field::Empty);
    }

    pub fn push_value(&mut self, value: impl Into<String>) {
        self.fields.push(Field::value(value));
    }

    pub fn push_composite(&mut self, parts: Vec<String>) {
        self.fields.push(Field::composite(parts));
    }

    fn serialize(&self, encoding: &Hl7Encoding) -> String {
        let mut line = self.name.clone();
        for field in &self.fields {
            line.push(encoding.field);
            line.push_str(&field.serialize(encoding));
        }
        line
    }
}

/// A complete wire message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireMessage {
    encoding: Hl7Encoding,
    segments: Vec<Segment>,
}

impl WireMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encoding(&self) -> &Hl7Encoding {
        &self.encoding
    }

    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Flattens the message to wire text
    ///
    /// Every segment, including the last, is terminated with the segment
    /// delimiter.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push_str(&segment.serialize(&self.encoding));
            out.push_str(SEGMENT_DELIMITER);
        }
        out
    }
}
