//! Path element and path types.

use std::fmt;

/// PathElement represents one level of descent into a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathElement {
    /// Field name of a map member.
    FieldName(String),
    /// Position of a list element.
    Index(usize),
    /// The slot past the last list element (`-` in a JSON Pointer).
    Append,
}

impl PathElement {
    /// Creates a new field name path element.
    pub fn field_name(name: impl Into<String>) -> Self {
        PathElement::FieldName(name.into())
    }
}

/// Path identifies a location in a resource document.
///
/// It renders as an RFC 6901 JSON Pointer; the empty path is the document
/// root and renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    elements: Vec<PathElement>,
}

impl Path {
    /// Creates the root path.
    pub fn new() -> Self {
        Path {
            elements: Vec::new(),
        }
    }

    /// Creates a path from a vector of elements.
    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        Path { elements }
    }

    /// Parses a JSON Pointer.
    ///
    /// Both `""` and `"/"` denote the root. Tokens that are all digits become
    /// indices and `-` becomes [`PathElement::Append`]; whether a token really
    /// addresses a list is only known once it is resolved against a document,
    /// see [`Path::token`].
    pub fn parse(pointer: &str) -> Result<Path, PointerError> {
        if pointer.is_empty() || pointer == "/" {
            return Ok(Path::new());
        }
        let rest = pointer
            .strip_prefix('/')
            .ok_or_else(|| PointerError::new(pointer, "must start with '/'"))?;

        let mut elements = Vec::new();
        for raw in rest.split('/') {
            let token = unescape(raw).map_err(|msg| PointerError::new(pointer, msg))?;
            let element = if token == "-" {
                PathElement::Append
            } else if is_index(&token) {
                match token.parse::<usize>() {
                    Ok(i) => PathElement::Index(i),
                    Err(_) => PathElement::FieldName(token),
                }
            } else {
                PathElement::FieldName(token)
            };
            elements.push(element);
        }
        Ok(Path { elements })
    }

    /// Returns the number of elements in the path.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an iterator over the path elements.
    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.elements.iter()
    }

    /// Appends a path element.
    pub fn push(&mut self, element: PathElement) {
        self.elements.push(element);
    }

    /// Removes and returns the last path element.
    pub fn pop(&mut self) -> Option<PathElement> {
        self.elements.pop()
    }

    /// Returns the last path element.
    pub fn last(&self) -> Option<&PathElement> {
        self.elements.last()
    }

    /// Creates a new path with the given element appended.
    pub fn with(&self, element: PathElement) -> Self {
        let mut new_path = self.clone();
        new_path.push(element);
        new_path
    }

    /// Creates a new path descending into the named map member.
    pub fn with_field(&self, name: impl Into<String>) -> Self {
        self.with(PathElement::FieldName(name.into()))
    }

    /// Creates a new path descending into the list element at `i`.
    pub fn with_index(&self, i: usize) -> Self {
        self.with(PathElement::Index(i))
    }

    /// Returns a slice of the path elements.
    pub fn as_slice(&self) -> &[PathElement] {
        &self.elements
    }

    /// Renders the path as a JSON Pointer.
    pub fn to_pointer(&self) -> String {
        self.to_string()
    }
}

impl PathElement {
    /// Returns the raw (unescaped) pointer token of this element.
    ///
    /// An index parsed from a pointer may name a map member such as `"80"`;
    /// callers resolving against a map use this token as the key.
    pub fn token(&self) -> String {
        match self {
            PathElement::FieldName(name) => name.clone(),
            PathElement::Index(i) => i.to_string(),
            PathElement::Append => "-".to_string(),
        }
    }
}

fn is_index(token: &str) -> bool {
    !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'))
}

/// Escapes a reference token: `~` becomes `~0` and `/` becomes `~1`.
pub fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape(token: &str) -> Result<String, &'static str> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err("'~' must be followed by '0' or '1'"),
        }
    }
    Ok(out)
}

impl FromIterator<PathElement> for Path {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        Path {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::FieldName(name) => write!(f, "/{}", escape(name)),
            PathElement::Index(i) => write!(f, "/{}", i),
            PathElement::Append => write!(f, "/-"),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

/// PointerError is returned when a JSON Pointer cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid pointer {pointer:?}: {message}")]
pub struct PointerError {
    pub pointer: String,
    pub message: String,
}

impl PointerError {
    fn new(pointer: &str, message: impl Into<String>) -> Self {
        PointerError {
            pointer: pointer.to_string(),
            message: message.into(),
        }
    }
}
