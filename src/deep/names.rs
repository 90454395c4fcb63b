use std::path::Path;

use crate::error::Error;

/// Class names, one per line, in class index order. Blank lines inside the
/// file are kept as empty labels so later class ids stay aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Names(Vec<String>);

impl Names {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::default();
        }

        Names(text
            .split('\n')
            .map(|l| l.trim_end_matches('\r').to_string())
            .collect())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        Ok(Self::parse(&text))
    }

    #[inline]
    pub fn get(&self, class_id: usize) -> Result<&str, Error> {
        self.0.get(class_id)
            .map(String::as_str)
            .ok_or(Error::UnknownClass(class_id))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> std::iter::FromIterator<S> for Names {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Names(iter.into_iter().map(Into::into).collect())
    }
}

#[test]
fn parse_names_file() {
    let names = Names::parse("person\r\nbicycle\ncar\n\n");

    assert_eq!(names.len(), 3);
    assert_eq!(names.get(0).unwrap(), "person");
    assert_eq!(names.get(1).unwrap(), "bicycle");
    assert_eq!(names.get(2).unwrap(), "car");
    assert!(matches!(names.get(3), Err(Error::UnknownClass(3))));
}

#[test]
fn empty_names_file() {
    assert!(Names::parse(" \n").is_empty());
}

#[test]
fn blank_lines_keep_class_ids_aligned() {
    let names = Names::parse("a\n\nb");

    assert_eq!(names.len(), 3);
    assert_eq!(names.get(1).unwrap(), "");
    assert_eq!(names.get(2).unwrap(), "b");
}
