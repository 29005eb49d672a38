use crate::attribute::Payload;
use crate::{ClassBuffer, ClassFileError, ClassFileResult, ClassWriter, ConstantPool};
use derive_more::TryFrom;
use java_string::JavaStr;
use std::fmt::{Display, Formatter, Write};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, TryFrom)]
#[repr(u8)]
#[try_from(repr)]
pub enum ElementValueTag {
    Byte = b'B',
    Char = b'C',
    Double = b'D',
    Float = b'F',
    Int = b'I',
    Long = b'J',
    Short = b'S',
    Boolean = b'Z',
    String = b's',
    Enum = b'e',
    Class = b'c',
    Annotation = b'@',
    Array = b'[',
}

impl ElementValueTag {
    pub fn from_u8(tag: u8) -> ClassFileResult<ElementValueTag> {
        ElementValueTag::try_from(tag).map_err(|_| ClassFileError::BadAnnotationTag(tag))
    }
}

/// The value of an annotation element. Primitive and string values refer to pool constants
/// by index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementValue {
    Byte(u16),
    Char(u16),
    Double(u16),
    Float(u16),
    Int(u16),
    Long(u16),
    Short(u16),
    Boolean(u16),
    String(u16),
    Enum {
        type_name_index: u16,
        const_name_index: u16,
    },
    Class(u16),
    Annotation(AnnotationEntry),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    pub fn tag(&self) -> ElementValueTag {
        match self {
            ElementValue::Byte(_) => ElementValueTag::Byte,
            ElementValue::Char(_) => ElementValueTag::Char,
            ElementValue::Double(_) => ElementValueTag::Double,
            ElementValue::Float(_) => ElementValueTag::Float,
            ElementValue::Int(_) => ElementValueTag::Int,
            ElementValue::Long(_) => ElementValueTag::Long,
            ElementValue::Short(_) => ElementValueTag::Short,
            ElementValue::Boolean(_) => ElementValueTag::Boolean,
            ElementValue::String(_) => ElementValueTag::String,
            ElementValue::Enum { .. } => ElementValueTag::Enum,
            ElementValue::Class(_) => ElementValueTag::Class,
            ElementValue::Annotation(_) => ElementValueTag::Annotation,
            ElementValue::Array(_) => ElementValueTag::Array,
        }
    }

    fn read(buf: &mut ClassBuffer<'_>, depth: usize) -> ClassFileResult<ElementValue> {
        let depth = depth
            .checked_sub(1)
            .ok_or(ClassFileError::TooDeepAnnotationNesting(0))?;
        let value = match ElementValueTag::from_u8(buf.read_u8()?)? {
            ElementValueTag::Byte => ElementValue::Byte(buf.read_u16()?),
            ElementValueTag::Char => ElementValue::Char(buf.read_u16()?),
            ElementValueTag::Double => ElementValue::Double(buf.read_u16()?),
            ElementValueTag::Float => ElementValue::Float(buf.read_u16()?),
            ElementValueTag::Int => ElementValue::Int(buf.read_u16()?),
            ElementValueTag::Long => ElementValue::Long(buf.read_u16()?),
            ElementValueTag::Short => ElementValue::Short(buf.read_u16()?),
            ElementValueTag::Boolean => ElementValue::Boolean(buf.read_u16()?),
            ElementValueTag::String => ElementValue::String(buf.read_u16()?),
            ElementValueTag::Enum => ElementValue::Enum {
                type_name_index: buf.read_u16()?,
                const_name_index: buf.read_u16()?,
            },
            ElementValueTag::Class => ElementValue::Class(buf.read_u16()?),
            ElementValueTag::Annotation => {
                ElementValue::Annotation(AnnotationEntry::read(buf, depth)?)
            }
            ElementValueTag::Array => {
                ElementValue::Array(buf.read_vec(|buf| ElementValue::read(buf, depth))?)
            }
        };
        Ok(value)
    }

    fn write(&self, w: &mut ClassWriter) -> ClassFileResult<()> {
        w.write_u8(self.tag() as u8);
        match self {
            ElementValue::Byte(index)
            | ElementValue::Char(index)
            | ElementValue::Double(index)
            | ElementValue::Float(index)
            | ElementValue::Int(index)
            | ElementValue::Long(index)
            | ElementValue::Short(index)
            | ElementValue::Boolean(index)
            | ElementValue::String(index)
            | ElementValue::Class(index) => w.write_u16(*index),
            ElementValue::Enum {
                type_name_index,
                const_name_index,
            } => {
                w.write_u16(*type_name_index);
                w.write_u16(*const_name_index);
            }
            ElementValue::Annotation(annotation) => annotation.write(w)?,
            ElementValue::Array(values) => {
                w.write_vec("array elements", values, |w, value| value.write(w))?
            }
        }
        Ok(())
    }

    pub fn encoded_len(&self) -> usize {
        1 + match self {
            ElementValue::Enum { .. } => 4,
            ElementValue::Annotation(annotation) => annotation.encoded_len(),
            ElementValue::Array(values) => {
                2 + values.iter().map(ElementValue::encoded_len).sum::<usize>()
            }
            _ => 2,
        }
    }

    /// Renders the value against `pool`, e.g. `[1,2]` for an int array.
    pub fn display<'a>(&'a self, pool: &'a ConstantPool) -> ElementValueDisplay<'a> {
        ElementValueDisplay { value: self, pool }
    }

    pub fn to_string(&self, pool: &ConstantPool) -> ClassFileResult<String> {
        let mut out = String::new();
        self.render(pool, &mut out)?;
        Ok(out)
    }

    fn render(&self, pool: &ConstantPool, out: &mut String) -> ClassFileResult<()> {
        // writing to a String can't fail
        let _ = match self {
            ElementValue::Byte(index) | ElementValue::Short(index) | ElementValue::Int(index) => {
                write!(out, "{}", pool.get_i32(*index)?)
            }
            ElementValue::Char(index) => {
                let value = pool.get_i32(*index)?;
                match char::from_u32(value as u32) {
                    Some(c) => write!(out, "'{c}'"),
                    None => write!(out, "'\\u{value:04x}'"),
                }
            }
            ElementValue::Boolean(index) => write!(out, "{}", pool.get_i32(*index)? != 0),
            ElementValue::Double(index) => write!(out, "{}", pool.get_f64(*index)?),
            ElementValue::Float(index) => write!(out, "{}", pool.get_f32(*index)?),
            ElementValue::Long(index) => write!(out, "{}", pool.get_i64(*index)?),
            ElementValue::String(index) => write!(out, "\"{}\"", pool.get_utf8(*index)?),
            ElementValue::Enum {
                type_name_index,
                const_name_index,
            } => write!(
                out,
                "{}.{}",
                pool.get_utf8(*type_name_index)?,
                pool.get_utf8(*const_name_index)?
            ),
            ElementValue::Class(index) => write!(out, "{}", pool.get_utf8(*index)?),
            ElementValue::Annotation(annotation) => {
                annotation.render(pool, out)?;
                Ok(())
            }
            ElementValue::Array(values) => {
                out.push('[');
                for (i, value) in values.iter().enumerate() {
                    if i != 0 {
                        out.push(',');
                    }
                    value.render(pool, out)?;
                }
                out.push(']');
                Ok(())
            }
        };
        Ok(())
    }
}

/// See [`ElementValue::display`]. Unresolvable indices render as `<bad index>`.
#[derive(Debug, Copy, Clone)]
pub struct ElementValueDisplay<'a> {
    value: &'a ElementValue,
    pool: &'a ConstantPool,
}

impl Display for ElementValueDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.value.to_string(self.pool) {
            Ok(rendered) => f.write_str(&rendered),
            Err(_) => f.write_str("<bad index>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementValuePair {
    pub element_name_index: u16,
    pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotationEntry {
    /// Index of the field descriptor of the annotation interface.
    pub type_index: u16,
    pub element_value_pairs: Vec<ElementValuePair>,
}

impl AnnotationEntry {
    fn read(buf: &mut ClassBuffer<'_>, depth: usize) -> ClassFileResult<AnnotationEntry> {
        let type_index = buf.read_u16()?;
        let element_value_pairs = buf.read_vec(|buf| {
            Ok(ElementValuePair {
                element_name_index: buf.read_u16()?,
                value: ElementValue::read(buf, depth)?,
            })
        })?;
        Ok(AnnotationEntry {
            type_index,
            element_value_pairs,
        })
    }

    fn write(&self, w: &mut ClassWriter) -> ClassFileResult<()> {
        w.write_u16(self.type_index);
        w.write_vec("element value pairs", &self.element_value_pairs, |w, pair| {
            w.write_u16(pair.element_name_index);
            pair.value.write(w)
        })
    }

    pub fn encoded_len(&self) -> usize {
        2 + 2
            + self
                .element_value_pairs
                .iter()
                .map(|pair| 2 + pair.value.encoded_len())
                .sum::<usize>()
    }

    pub fn type_descriptor<'pool>(
        &self,
        pool: &'pool ConstantPool,
    ) -> ClassFileResult<&'pool JavaStr> {
        pool.get_utf8(self.type_index)
    }

    /// The value of the element named `name`, if present.
    pub fn element(&self, pool: &ConstantPool, name: &str) -> Option<&ElementValue> {
        self.element_value_pairs
            .iter()
            .find(|pair| {
                pool.get_utf8(pair.element_name_index)
                    .is_ok_and(|element| element == JavaStr::from_str(name))
            })
            .map(|pair| &pair.value)
    }

    fn render(&self, pool: &ConstantPool, out: &mut String) -> ClassFileResult<()> {
        let _ = write!(out, "@{}(", pool.get_utf8(self.type_index)?);
        for (i, pair) in self.element_value_pairs.iter().enumerate() {
            if i != 0 {
                out.push(',');
            }
            let _ = write!(out, "{}=", pool.get_utf8(pair.element_name_index)?);
            pair.value.render(pool, out)?;
        }
        out.push(')');
        Ok(())
    }
}

/// `RuntimeVisibleAnnotations` or `RuntimeInvisibleAnnotations`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Annotations {
    pub annotations: Vec<AnnotationEntry>,
}

impl Annotations {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>, max_depth: usize) -> ClassFileResult<Annotations> {
        let annotations = buf.read_vec(|buf| {
            AnnotationEntry::read(buf, max_depth).map_err(|err| with_limit(err, max_depth))
        })?;
        Ok(Annotations { annotations })
    }
}

impl Payload for Annotations {
    fn payload_len(&self) -> usize {
        2 + self
            .annotations
            .iter()
            .map(AnnotationEntry::encoded_len)
            .sum::<usize>()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_vec("annotations", &self.annotations, |w, annotation| {
            annotation.write(w)
        })
    }
}

/// `RuntimeVisibleParameterAnnotations` or `RuntimeInvisibleParameterAnnotations`; the
/// parameter count is a single byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ParameterAnnotations {
    pub parameters: Vec<Vec<AnnotationEntry>>,
}

impl ParameterAnnotations {
    pub(crate) fn read(
        buf: &mut ClassBuffer<'_>,
        max_depth: usize,
    ) -> ClassFileResult<ParameterAnnotations> {
        let count = buf.read_u8()?;
        let parameters = (0..count)
            .map(|_| {
                buf.read_vec(|buf| {
                    AnnotationEntry::read(buf, max_depth)
                        .map_err(|err| with_limit(err, max_depth))
                })
            })
            .collect::<ClassFileResult<Vec<_>>>()?;
        Ok(ParameterAnnotations { parameters })
    }
}

impl Payload for ParameterAnnotations {
    fn payload_len(&self) -> usize {
        1 + self
            .parameters
            .iter()
            .map(|annotations| {
                2 + annotations
                    .iter()
                    .map(AnnotationEntry::encoded_len)
                    .sum::<usize>()
            })
            .sum::<usize>()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_count_u8("annotated parameters", self.parameters.len())?;
        for annotations in &self.parameters {
            w.write_vec("annotations", annotations, |w, annotation| {
                annotation.write(w)
            })?;
        }
        Ok(())
    }
}

/// The default value of an annotation interface element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotationDefault {
    pub default_value: ElementValue,
}

impl AnnotationDefault {
    pub(crate) fn read(
        buf: &mut ClassBuffer<'_>,
        max_depth: usize,
    ) -> ClassFileResult<AnnotationDefault> {
        let default_value =
            ElementValue::read(buf, max_depth).map_err(|err| with_limit(err, max_depth))?;
        Ok(AnnotationDefault { default_value })
    }
}

impl Payload for AnnotationDefault {
    fn payload_len(&self) -> usize {
        self.default_value.encoded_len()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        self.default_value.write(w)
    }
}

/// Replaces the placeholder limit reported by the innermost element with the configured one.
fn with_limit(err: ClassFileError, max_depth: usize) -> ClassFileError {
    match err {
        ClassFileError::TooDeepAnnotationNesting(_) => {
            ClassFileError::TooDeepAnnotationNesting(max_depth)
        }
        other => other,
    }
}

#[cfg(test)]
mod test {
    use crate::attribute::Payload;
    use crate::{
        AnnotationDefault, AnnotationEntry, Annotations, ClassBuffer, ClassFileError, ClassWriter,
        Constant, ConstantPool, ElementValue, ElementValuePair, ErrorKind, ParameterAnnotations,
    };

    fn encode(payload: &impl Payload) -> Vec<u8> {
        let mut writer = ClassWriter::new();
        payload
            .write_payload(&mut writer, &ConstantPool::new())
            .unwrap();
        assert_eq!(payload.payload_len(), writer.len());
        writer.into_bytes()
    }

    /// An annotation whose single element is an array nesting `depth` levels deep.
    fn nested_array(depth: usize) -> Vec<u8> {
        let mut bytes = vec![0, 1, 0, 1, 0, 1, 0, 2];
        for _ in 0..depth {
            bytes.extend_from_slice(&[b'[', 0, 1]);
        }
        bytes.extend_from_slice(&[b'I', 0, 3]);
        bytes
    }

    #[test]
    fn test_nested_annotation_round_trip() {
        let inner = AnnotationEntry {
            type_index: 4,
            element_value_pairs: vec![ElementValuePair {
                element_name_index: 5,
                value: ElementValue::Enum {
                    type_name_index: 6,
                    const_name_index: 7,
                },
            }],
        };
        let annotations = Annotations {
            annotations: vec![AnnotationEntry {
                type_index: 1,
                element_value_pairs: vec![
                    ElementValuePair {
                        element_name_index: 2,
                        value: ElementValue::Array(vec![
                            ElementValue::Int(3),
                            ElementValue::Annotation(inner),
                            ElementValue::Class(8),
                        ]),
                    },
                    ElementValuePair {
                        element_name_index: 9,
                        value: ElementValue::Array(Vec::new()),
                    },
                ],
            }],
        };
        let bytes = encode(&annotations);
        let mut buf = ClassBuffer::new(&bytes);
        assert_eq!(annotations, Annotations::read(&mut buf, 64).unwrap());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_primitive_array_inside_annotation_inside_array() {
        let inner = AnnotationEntry {
            type_index: 3,
            element_value_pairs: vec![ElementValuePair {
                element_name_index: 4,
                value: ElementValue::Array(vec![ElementValue::Int(5), ElementValue::Long(6)]),
            }],
        };
        let annotations = Annotations {
            annotations: vec![AnnotationEntry {
                type_index: 1,
                element_value_pairs: vec![ElementValuePair {
                    element_name_index: 2,
                    value: ElementValue::Array(vec![ElementValue::Annotation(inner)]),
                }],
            }],
        };
        let bytes = encode(&annotations);
        assert_eq!(27, bytes.len());
        assert_eq!(bytes.len(), annotations.payload_len());
        assert_eq!(&[b'[', 0, 2, b'I', 0, 5, b'J', 0, 6], &bytes[18..]);

        let mut buf = ClassBuffer::new(&bytes);
        let reread = Annotations::read(&mut buf, 64).unwrap();
        assert!(buf.is_empty());
        assert_eq!(annotations, reread);
        assert_eq!(bytes, encode(&reread));
    }

    #[test]
    fn test_unknown_element_tag() {
        let bytes = [0, 1, 0, 1, 0, 1, 0, 2, b'x', 0, 0];
        let mut buf = ClassBuffer::new(&bytes);
        let err = Annotations::read(&mut buf, 64).unwrap_err();
        assert!(matches!(err, ClassFileError::BadAnnotationTag(b'x')));
        assert_eq!(ErrorKind::StructuralFormat, err.kind());
    }

    #[test]
    fn test_nesting_limit() {
        let bytes = nested_array(3);
        // the array levels plus the innermost int
        assert!(Annotations::read(&mut ClassBuffer::new(&bytes), 4).is_ok());
        let err = Annotations::read(&mut ClassBuffer::new(&bytes), 3).unwrap_err();
        assert!(matches!(err, ClassFileError::TooDeepAnnotationNesting(3)));
        assert_eq!(ErrorKind::ResourceLimit, err.kind());
    }

    #[test]
    fn test_parameter_annotations() {
        let annotations = ParameterAnnotations {
            parameters: vec![
                Vec::new(),
                vec![AnnotationEntry {
                    type_index: 1,
                    element_value_pairs: Vec::new(),
                }],
            ],
        };
        let bytes = encode(&annotations);
        assert_eq!(vec![2, 0, 0, 0, 1, 0, 1, 0, 0], bytes);
        let reread = ParameterAnnotations::read(&mut ClassBuffer::new(&bytes), 64).unwrap();
        assert_eq!(annotations, reread);
    }

    #[test]
    fn test_display() {
        let mut pool = ConstantPool::new();
        let one = pool.add(Constant::Integer(1)).unwrap();
        let two = pool.add(Constant::Integer(2)).unwrap();
        let name = pool.add_utf8("name").unwrap();
        let ty = pool.add_utf8("LTag;").unwrap();
        let value = ElementValue::Array(vec![ElementValue::Int(one), ElementValue::Int(two)]);
        assert_eq!("[1,2]", value.display(&pool).to_string());

        let annotation = ElementValue::Annotation(AnnotationEntry {
            type_index: ty,
            element_value_pairs: vec![ElementValuePair {
                element_name_index: name,
                value: ElementValue::String(name),
            }],
        });
        assert_eq!("@LTag;(name=\"name\")", annotation.to_string(&pool).unwrap());
        assert_eq!("<bad index>", ElementValue::Int(name).display(&pool).to_string());

        let default = AnnotationDefault {
            default_value: value,
        };
        assert_eq!(default.payload_len(), encode(&default).len());
    }
}
