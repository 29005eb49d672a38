mod annotation;
mod bootstrap;
mod code;
mod module;
mod nest;
mod record;
mod simple;
mod stack_map;

pub use annotation::*;
pub use bootstrap::*;
pub use code::*;
pub use module::*;
pub use nest::*;
pub use record::*;
pub use simple::*;
pub use stack_map::*;

use crate::constants::*;
use crate::{
    ClassBuffer, ClassFileError, ClassFileResult, ClassWriter, ConstantPool, ReadOptions,
};
use derive_more::IsVariant;
use java_string::{JavaStr, JavaString};
use std::fmt::{Debug, Formatter};
use std::ops::{Deref, DerefMut};

/// The payload encoding shared by every attribute kind.
pub(crate) trait Payload {
    fn payload_len(&self) -> usize;

    fn write_payload(&self, w: &mut ClassWriter, pool: &ConstantPool) -> ClassFileResult<()>;
}

/// An attribute whose length depends on nested children and is therefore cached and
/// recomputed on every mutation.
pub trait Composite {
    /// The declared payload length, as written to the class file.
    fn length(&self) -> u32;

    /// Recomputes [`length`](Composite::length) from the current children.
    fn recompute_length(&mut self);
}

pub(crate) fn saturating_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Mutable access to a child of a [`Composite`]. The owner's length is recomputed when the
/// guard is dropped, so a stale length can never be observed.
pub struct LengthGuard<'a, C: Composite, T: ?Sized> {
    owner: &'a mut C,
    get: fn(&C) -> &T,
    get_mut: fn(&mut C) -> &mut T,
}

impl<'a, C: Composite, T: ?Sized> LengthGuard<'a, C, T> {
    pub(crate) fn new(
        owner: &'a mut C,
        get: fn(&C) -> &T,
        get_mut: fn(&mut C) -> &mut T,
    ) -> LengthGuard<'a, C, T> {
        LengthGuard { owner, get, get_mut }
    }
}

impl<C: Composite, T: ?Sized> Deref for LengthGuard<'_, C, T> {
    type Target = T;

    fn deref(&self) -> &T {
        (self.get)(self.owner)
    }
}

impl<C: Composite, T: ?Sized> DerefMut for LengthGuard<'_, C, T> {
    fn deref_mut(&mut self) -> &mut T {
        (self.get_mut)(self.owner)
    }
}

impl<C: Composite, T: ?Sized> Drop for LengthGuard<'_, C, T> {
    fn drop(&mut self) {
        self.owner.recompute_length();
    }
}

impl<C: Composite, T: ?Sized + Debug> Debug for LengthGuard<'_, C, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&**self, f)
    }
}

/// An attribute whose name is not recognized, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UnknownAttribute {
    pub data: Vec<u8>,
}

impl UnknownAttribute {
    fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<UnknownAttribute> {
        let len = buf.remaining();
        Ok(UnknownAttribute {
            data: buf.read_bytes(len)?.to_vec(),
        })
    }
}

impl Payload for UnknownAttribute {
    fn payload_len(&self) -> usize {
        self.data.len()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_bytes(&self.data);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, IsVariant)]
pub enum AttributeInfo {
    SourceFile(SourceFile),
    ConstantValue(ConstantValue),
    Code(Code),
    Exceptions(Exceptions),
    LineNumberTable(LineNumberTable),
    LocalVariableTable(LocalVariableTable),
    LocalVariableTypeTable(LocalVariableTypeTable),
    InnerClasses(InnerClasses),
    Synthetic(Synthetic),
    Deprecated(Deprecated),
    Signature(Signature),
    StackMapTable(StackMapTable),
    RuntimeVisibleAnnotations(Annotations),
    RuntimeInvisibleAnnotations(Annotations),
    RuntimeVisibleParameterAnnotations(ParameterAnnotations),
    RuntimeInvisibleParameterAnnotations(ParameterAnnotations),
    AnnotationDefault(AnnotationDefault),
    BootstrapMethods(BootstrapMethods),
    MethodParameters(MethodParameters),
    Module(Module),
    ModulePackages(ModulePackages),
    ModuleMainClass(ModuleMainClass),
    Record(Record),
    PermittedSubclasses(PermittedSubclasses),
    NestHost(NestHost),
    NestMembers(NestMembers),
    EnclosingMethod(EnclosingMethod),
    SourceDebugExtension(SourceDebugExtension),
    Unknown(UnknownAttribute),
}

const KNOWN_NAMES: &[&str] = &[
    SOURCE_FILE,
    CONSTANT_VALUE,
    CODE,
    EXCEPTIONS,
    LINE_NUMBER_TABLE,
    LOCAL_VARIABLE_TABLE,
    LOCAL_VARIABLE_TYPE_TABLE,
    INNER_CLASSES,
    SYNTHETIC,
    DEPRECATED,
    SIGNATURE,
    STACK_MAP_TABLE,
    RUNTIME_VISIBLE_ANNOTATIONS,
    RUNTIME_INVISIBLE_ANNOTATIONS,
    RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS,
    RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS,
    ANNOTATION_DEFAULT,
    BOOTSTRAP_METHODS,
    METHOD_PARAMETERS,
    MODULE,
    MODULE_PACKAGES,
    MODULE_MAIN_CLASS,
    RECORD,
    PERMITTED_SUBCLASSES,
    NEST_HOST,
    NEST_MEMBERS,
    ENCLOSING_METHOD,
    SOURCE_DEBUG_EXTENSION,
];

impl AttributeInfo {
    /// The name this kind of attribute is stored under, `None` for [`AttributeInfo::Unknown`].
    pub fn canonical_name(&self) -> Option<&'static str> {
        let name = match self {
            AttributeInfo::SourceFile(_) => SOURCE_FILE,
            AttributeInfo::ConstantValue(_) => CONSTANT_VALUE,
            AttributeInfo::Code(_) => CODE,
            AttributeInfo::Exceptions(_) => EXCEPTIONS,
            AttributeInfo::LineNumberTable(_) => LINE_NUMBER_TABLE,
            AttributeInfo::LocalVariableTable(_) => LOCAL_VARIABLE_TABLE,
            AttributeInfo::LocalVariableTypeTable(_) => LOCAL_VARIABLE_TYPE_TABLE,
            AttributeInfo::InnerClasses(_) => INNER_CLASSES,
            AttributeInfo::Synthetic(_) => SYNTHETIC,
            AttributeInfo::Deprecated(_) => DEPRECATED,
            AttributeInfo::Signature(_) => SIGNATURE,
            AttributeInfo::StackMapTable(_) => STACK_MAP_TABLE,
            AttributeInfo::RuntimeVisibleAnnotations(_) => RUNTIME_VISIBLE_ANNOTATIONS,
            AttributeInfo::RuntimeInvisibleAnnotations(_) => RUNTIME_INVISIBLE_ANNOTATIONS,
            AttributeInfo::RuntimeVisibleParameterAnnotations(_) => {
                RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS
            }
            AttributeInfo::RuntimeInvisibleParameterAnnotations(_) => {
                RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS
            }
            AttributeInfo::AnnotationDefault(_) => ANNOTATION_DEFAULT,
            AttributeInfo::BootstrapMethods(_) => BOOTSTRAP_METHODS,
            AttributeInfo::MethodParameters(_) => METHOD_PARAMETERS,
            AttributeInfo::Module(_) => MODULE,
            AttributeInfo::ModulePackages(_) => MODULE_PACKAGES,
            AttributeInfo::ModuleMainClass(_) => MODULE_MAIN_CLASS,
            AttributeInfo::Record(_) => RECORD,
            AttributeInfo::PermittedSubclasses(_) => PERMITTED_SUBCLASSES,
            AttributeInfo::NestHost(_) => NEST_HOST,
            AttributeInfo::NestMembers(_) => NEST_MEMBERS,
            AttributeInfo::EnclosingMethod(_) => ENCLOSING_METHOD,
            AttributeInfo::SourceDebugExtension(_) => SOURCE_DEBUG_EXTENSION,
            AttributeInfo::Unknown(_) => return None,
        };
        Some(name)
    }

    fn payload(&self) -> &dyn Payload {
        match self {
            AttributeInfo::SourceFile(attr) => attr,
            AttributeInfo::ConstantValue(attr) => attr,
            AttributeInfo::Code(attr) => attr,
            AttributeInfo::Exceptions(attr) => attr,
            AttributeInfo::LineNumberTable(attr) => attr,
            AttributeInfo::LocalVariableTable(attr) => attr,
            AttributeInfo::LocalVariableTypeTable(attr) => attr,
            AttributeInfo::InnerClasses(attr) => attr,
            AttributeInfo::Synthetic(attr) => attr,
            AttributeInfo::Deprecated(attr) => attr,
            AttributeInfo::Signature(attr) => attr,
            AttributeInfo::StackMapTable(attr) => attr,
            AttributeInfo::RuntimeVisibleAnnotations(attr)
            | AttributeInfo::RuntimeInvisibleAnnotations(attr) => attr,
            AttributeInfo::RuntimeVisibleParameterAnnotations(attr)
            | AttributeInfo::RuntimeInvisibleParameterAnnotations(attr) => attr,
            AttributeInfo::AnnotationDefault(attr) => attr,
            AttributeInfo::BootstrapMethods(attr) => attr,
            AttributeInfo::MethodParameters(attr) => attr,
            AttributeInfo::Module(attr) => attr,
            AttributeInfo::ModulePackages(attr) => attr,
            AttributeInfo::ModuleMainClass(attr) => attr,
            AttributeInfo::Record(attr) => attr,
            AttributeInfo::PermittedSubclasses(attr) => attr,
            AttributeInfo::NestHost(attr) => attr,
            AttributeInfo::NestMembers(attr) => attr,
            AttributeInfo::EnclosingMethod(attr) => attr,
            AttributeInfo::SourceDebugExtension(attr) => attr,
            AttributeInfo::Unknown(attr) => attr,
        }
    }

    fn decode(
        name: &str,
        buf: &mut ClassBuffer<'_>,
        pool: &ConstantPool,
        options: &ReadOptions,
    ) -> ClassFileResult<AttributeInfo> {
        let depth = options.max_annotation_depth;
        let info = match name {
            SOURCE_FILE => AttributeInfo::SourceFile(SourceFile::read(buf)?),
            CONSTANT_VALUE => AttributeInfo::ConstantValue(ConstantValue::read(buf)?),
            CODE => AttributeInfo::Code(Code::read(buf, pool, options)?),
            EXCEPTIONS => AttributeInfo::Exceptions(Exceptions::read(buf)?),
            LINE_NUMBER_TABLE => AttributeInfo::LineNumberTable(LineNumberTable::read(buf)?),
            LOCAL_VARIABLE_TABLE => {
                AttributeInfo::LocalVariableTable(LocalVariableTable::read(buf)?)
            }
            LOCAL_VARIABLE_TYPE_TABLE => {
                AttributeInfo::LocalVariableTypeTable(LocalVariableTypeTable::read(buf)?)
            }
            INNER_CLASSES => AttributeInfo::InnerClasses(InnerClasses::read(buf)?),
            SYNTHETIC => AttributeInfo::Synthetic(Synthetic),
            DEPRECATED => AttributeInfo::Deprecated(Deprecated),
            SIGNATURE => AttributeInfo::Signature(Signature::read(buf)?),
            STACK_MAP_TABLE => AttributeInfo::StackMapTable(StackMapTable::read(buf)?),
            RUNTIME_VISIBLE_ANNOTATIONS => {
                AttributeInfo::RuntimeVisibleAnnotations(Annotations::read(buf, depth)?)
            }
            RUNTIME_INVISIBLE_ANNOTATIONS => {
                AttributeInfo::RuntimeInvisibleAnnotations(Annotations::read(buf, depth)?)
            }
            RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS => {
                AttributeInfo::RuntimeVisibleParameterAnnotations(ParameterAnnotations::read(
                    buf, depth,
                )?)
            }
            RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS => {
                AttributeInfo::RuntimeInvisibleParameterAnnotations(ParameterAnnotations::read(
                    buf, depth,
                )?)
            }
            ANNOTATION_DEFAULT => {
                AttributeInfo::AnnotationDefault(AnnotationDefault::read(buf, depth)?)
            }
            BOOTSTRAP_METHODS => AttributeInfo::BootstrapMethods(BootstrapMethods::read(buf)?),
            METHOD_PARAMETERS => AttributeInfo::MethodParameters(MethodParameters::read(buf)?),
            MODULE => AttributeInfo::Module(Module::read(buf)?),
            MODULE_PACKAGES => AttributeInfo::ModulePackages(ModulePackages::read(buf)?),
            MODULE_MAIN_CLASS => AttributeInfo::ModuleMainClass(ModuleMainClass::read(buf)?),
            RECORD => AttributeInfo::Record(Record::read(buf, pool, options)?),
            PERMITTED_SUBCLASSES => {
                AttributeInfo::PermittedSubclasses(PermittedSubclasses::read(buf)?)
            }
            NEST_HOST => AttributeInfo::NestHost(NestHost::read(buf)?),
            NEST_MEMBERS => AttributeInfo::NestMembers(NestMembers::read(buf)?),
            ENCLOSING_METHOD => AttributeInfo::EnclosingMethod(EnclosingMethod::read(buf)?),
            SOURCE_DEBUG_EXTENSION => {
                AttributeInfo::SourceDebugExtension(SourceDebugExtension::read(buf)?)
            }
            _ => AttributeInfo::Unknown(UnknownAttribute::read(buf)?),
        };
        Ok(info)
    }
}

macro_rules! attribute_accessors {
    ($($variant:ident, $getter:ident, $getter_mut:ident: $ty:ty;)*) => {
        impl AttributeInfo {
            $(
            pub fn $getter(&self) -> Option<&$ty> {
                match self {
                    AttributeInfo::$variant(attr) => Some(attr),
                    _ => None,
                }
            }

            pub fn $getter_mut(&mut self) -> Option<&mut $ty> {
                match self {
                    AttributeInfo::$variant(attr) => Some(attr),
                    _ => None,
                }
            }
            )*
        }
    }
}

attribute_accessors! {
    SourceFile, as_source_file, as_source_file_mut: SourceFile;
    ConstantValue, as_constant_value, as_constant_value_mut: ConstantValue;
    Code, as_code, as_code_mut: Code;
    Exceptions, as_exceptions, as_exceptions_mut: Exceptions;
    LineNumberTable, as_line_number_table, as_line_number_table_mut: LineNumberTable;
    LocalVariableTable, as_local_variable_table, as_local_variable_table_mut: LocalVariableTable;
    LocalVariableTypeTable, as_local_variable_type_table, as_local_variable_type_table_mut: LocalVariableTypeTable;
    InnerClasses, as_inner_classes, as_inner_classes_mut: InnerClasses;
    Signature, as_signature, as_signature_mut: Signature;
    StackMapTable, as_stack_map_table, as_stack_map_table_mut: StackMapTable;
    RuntimeVisibleAnnotations, as_runtime_visible_annotations, as_runtime_visible_annotations_mut: Annotations;
    RuntimeInvisibleAnnotations, as_runtime_invisible_annotations, as_runtime_invisible_annotations_mut: Annotations;
    RuntimeVisibleParameterAnnotations, as_runtime_visible_parameter_annotations, as_runtime_visible_parameter_annotations_mut: ParameterAnnotations;
    RuntimeInvisibleParameterAnnotations, as_runtime_invisible_parameter_annotations, as_runtime_invisible_parameter_annotations_mut: ParameterAnnotations;
    AnnotationDefault, as_annotation_default, as_annotation_default_mut: AnnotationDefault;
    BootstrapMethods, as_bootstrap_methods, as_bootstrap_methods_mut: BootstrapMethods;
    MethodParameters, as_method_parameters, as_method_parameters_mut: MethodParameters;
    Module, as_module, as_module_mut: Module;
    ModulePackages, as_module_packages, as_module_packages_mut: ModulePackages;
    ModuleMainClass, as_module_main_class, as_module_main_class_mut: ModuleMainClass;
    Record, as_record, as_record_mut: Record;
    PermittedSubclasses, as_permitted_subclasses, as_permitted_subclasses_mut: PermittedSubclasses;
    NestHost, as_nest_host, as_nest_host_mut: NestHost;
    NestMembers, as_nest_members, as_nest_members_mut: NestMembers;
    EnclosingMethod, as_enclosing_method, as_enclosing_method_mut: EnclosingMethod;
    SourceDebugExtension, as_source_debug_extension, as_source_debug_extension_mut: SourceDebugExtension;
    Unknown, as_unknown, as_unknown_mut: UnknownAttribute;
}

/// A named attribute of a class, field, method, `Code` attribute or record component.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Index of the `Utf8` constant holding the attribute name.
    pub name_index: u16,
    pub info: AttributeInfo,
}

impl Attribute {
    /// Wraps a known attribute kind, adding its name to the pool if needed.
    ///
    /// Unknown attributes carry no name of their own; build them with [`Attribute::unknown`].
    pub fn new(pool: &mut ConstantPool, info: AttributeInfo) -> ClassFileResult<Attribute> {
        let name = info
            .canonical_name()
            .ok_or(ClassFileError::UnnamedAttribute)?;
        Ok(Attribute {
            name_index: pool.add_utf8(name)?,
            info,
        })
    }

    pub fn unknown(
        pool: &mut ConstantPool,
        name: impl Into<JavaString>,
        data: Vec<u8>,
    ) -> ClassFileResult<Attribute> {
        Ok(Attribute {
            name_index: pool.add_utf8(name)?,
            info: AttributeInfo::Unknown(UnknownAttribute { data }),
        })
    }

    pub fn name<'pool>(&self, pool: &'pool ConstantPool) -> ClassFileResult<&'pool JavaStr> {
        pool.get_utf8(self.name_index)
    }

    /// The declared payload length, excluding the 6-byte name and length header.
    pub fn length(&self) -> u32 {
        saturating_u32(self.info.payload().payload_len())
    }

    pub(crate) fn read(
        buf: &mut ClassBuffer<'_>,
        pool: &ConstantPool,
        options: &ReadOptions,
    ) -> ClassFileResult<Attribute> {
        let name_index = buf.read_u16()?;
        let length = buf.read_u32()?;
        let name = pool
            .get_utf8(name_index)
            .map_err(|_| ClassFileError::BadAttributeName { index: name_index })?;
        let known = name.as_str().ok().filter(|name| KNOWN_NAMES.contains(name));

        if known.is_none() && length > options.max_unknown_attribute_length {
            return Err(ClassFileError::AttributeTooLarge {
                name: name.to_owned(),
                len: length,
                max: options.max_unknown_attribute_length,
            });
        }

        let mut payload = buf.split(length as usize)?;
        let info = match known {
            Some(known) => AttributeInfo::decode(known, &mut payload, pool, options)?,
            None => {
                if name == JavaStr::from_str(STACK_MAP) {
                    tracing::warn!("keeping obsolete StackMap attribute as unknown bytes");
                } else {
                    tracing::debug!(%name, length, "unrecognized attribute kept as unknown bytes");
                }
                AttributeInfo::Unknown(UnknownAttribute::read(&mut payload)?)
            }
        };

        if !payload.is_empty() {
            return Err(ClassFileError::AttributeLengthMismatch {
                name: name.to_owned(),
                declared: length,
                actual: payload.position(),
            });
        }

        Ok(Attribute { name_index, info })
    }

    /// Writes the 6-byte header and the payload, refusing to write a payload whose size differs
    /// from [`length`](Attribute::length).
    pub(crate) fn write(&self, w: &mut ClassWriter, pool: &ConstantPool) -> ClassFileResult<()> {
        let declared = self.length();
        let mut payload = ClassWriter::new();
        self.info.payload().write_payload(&mut payload, pool)?;

        if payload.len() != declared as usize {
            return Err(ClassFileError::AttributeLengthMismatch {
                name: self.name(pool)?.to_owned(),
                declared,
                actual: payload.len(),
            });
        }

        w.write_u16(self.name_index);
        w.write_u32(declared);
        w.write_bytes(payload.as_bytes());
        Ok(())
    }
}

/// Size of a count-prefixed attribute list, headers included.
pub(crate) fn attributes_len(attributes: &[Attribute]) -> usize {
    2 + attributes
        .iter()
        .map(|attribute| 6 + attribute.length() as usize)
        .sum::<usize>()
}

pub(crate) fn read_attributes(
    buf: &mut ClassBuffer<'_>,
    pool: &ConstantPool,
    options: &ReadOptions,
) -> ClassFileResult<Vec<Attribute>> {
    buf.read_vec(|buf| Attribute::read(buf, pool, options))
}

pub(crate) fn write_attributes(
    w: &mut ClassWriter,
    attributes: &[Attribute],
    pool: &ConstantPool,
) -> ClassFileResult<()> {
    w.write_vec("attributes", attributes, |w, attribute| {
        attribute.write(w, pool)
    })
}

/// The first attribute matched by `extract`. Later attributes of the same kind are ignored.
pub fn find_attribute<'a, T: ?Sized>(
    attributes: &'a [Attribute],
    extract: impl Fn(&'a AttributeInfo) -> Option<&'a T>,
) -> Option<&'a T> {
    attributes
        .iter()
        .find_map(|attribute| extract(&attribute.info))
}

pub fn find_attribute_mut<'a, T: ?Sized>(
    attributes: &'a mut [Attribute],
    extract: impl Fn(&'a mut AttributeInfo) -> Option<&'a mut T>,
) -> Option<&'a mut T> {
    attributes
        .iter_mut()
        .find_map(|attribute| extract(&mut attribute.info))
}

#[cfg(test)]
mod test {
    use crate::{
        Attribute, AttributeInfo, ClassBuffer, ClassFileError, ClassWriter, ConstantPool,
        ErrorKind, ReadOptions, SourceFile, UnknownAttribute,
    };

    fn pool_with(names: &[&str]) -> ConstantPool {
        let mut pool = ConstantPool::new();
        for name in names {
            pool.add_utf8(*name).unwrap();
        }
        pool
    }

    fn read(bytes: &[u8], pool: &ConstantPool, options: &ReadOptions) -> Result<Attribute, ClassFileError> {
        let mut buf = ClassBuffer::new(bytes);
        let attribute = Attribute::read(&mut buf, pool, options)?;
        assert!(buf.is_empty());
        Ok(attribute)
    }

    fn write(attribute: &Attribute, pool: &ConstantPool) -> Vec<u8> {
        let mut writer = ClassWriter::new();
        attribute.write(&mut writer, pool).unwrap();
        writer.into_bytes()
    }

    #[test]
    fn test_unknown_attribute_passthrough() {
        let pool = pool_with(&["VendorExt"]);
        let bytes = [0, 1, 0, 0, 0, 3, 1, 2, 3];
        let attribute = read(&bytes, &pool, &ReadOptions::default()).unwrap();
        assert_eq!(
            AttributeInfo::Unknown(UnknownAttribute {
                data: vec![1, 2, 3]
            }),
            attribute.info
        );
        assert_eq!(3, attribute.length());
        assert_eq!(bytes.as_slice(), write(&attribute, &pool).as_slice());
    }

    #[test]
    fn test_unknown_attribute_cap() {
        let pool = pool_with(&["VendorExt"]);
        let bytes = [0, 1, 0, 0, 0, 3, 1, 2, 3];
        let options = ReadOptions::default().with_max_unknown_attribute_length(2);
        let err = read(&bytes, &pool, &options).unwrap_err();
        assert!(matches!(err, ClassFileError::AttributeTooLarge { len: 3, max: 2, .. }));
        assert_eq!(ErrorKind::ResourceLimit, err.kind());
    }

    #[test]
    fn test_known_attribute_is_not_capped() {
        let pool = pool_with(&["SourceFile", "Foo.java"]);
        let bytes = [0, 1, 0, 0, 0, 2, 0, 2];
        let options = ReadOptions::default().with_max_unknown_attribute_length(0);
        let attribute = read(&bytes, &pool, &options).unwrap();
        assert_eq!(
            Some(&SourceFile {
                sourcefile_index: 2
            }),
            attribute.info.as_source_file()
        );
        assert_eq!(bytes.as_slice(), write(&attribute, &pool).as_slice());
    }

    #[test]
    fn test_declared_length_must_match_payload() {
        let pool = pool_with(&["SourceFile"]);
        let bytes = [0, 1, 0, 0, 0, 3, 0, 2, 9];
        let err = read(&bytes, &pool, &ReadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ClassFileError::AttributeLengthMismatch {
                declared: 3,
                actual: 2,
                ..
            }
        ));
        assert_eq!(ErrorKind::StructuralFormat, err.kind());

        let short = [0, 1, 0, 0, 0, 1, 0];
        assert!(read(&short, &pool, &ReadOptions::default()).is_err());
    }

    #[test]
    fn test_truncated_payload() {
        let pool = pool_with(&["VendorExt"]);
        let bytes = [0, 1, 0, 0, 0, 9, 1, 2];
        assert!(matches!(
            read(&bytes, &pool, &ReadOptions::default()),
            Err(ClassFileError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_marker_attribute_must_be_empty() {
        let pool = pool_with(&["Deprecated"]);
        assert!(read(&[0, 1, 0, 0, 0, 0], &pool, &ReadOptions::default())
            .unwrap()
            .info
            .is_deprecated());
        assert!(read(&[0, 1, 0, 0, 0, 1, 0], &pool, &ReadOptions::default()).is_err());
    }

    #[test]
    fn test_name_must_be_utf8() {
        let mut pool = ConstantPool::new();
        pool.add_class("Foo").unwrap();
        let bytes = [0, 2, 0, 0, 0, 0];
        let err = read(&bytes, &pool, &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, ClassFileError::BadAttributeName { index: 2 }));
        assert_eq!(ErrorKind::StructuralFormat, err.kind());
    }

    #[test]
    fn test_missing_name_is_a_format_error() {
        let pool = pool_with(&["SourceFile"]);
        for bytes in [[0, 0, 0, 0, 0, 0], [0, 9, 0, 0, 0, 0]] {
            let err = read(&bytes, &pool, &ReadOptions::default()).unwrap_err();
            assert!(matches!(err, ClassFileError::BadAttributeName { .. }));
            assert_eq!(ErrorKind::StructuralFormat, err.kind());
        }
    }

    #[test]
    fn test_new_adds_name() {
        let mut pool = ConstantPool::new();
        let attribute = Attribute::new(
            &mut pool,
            AttributeInfo::SourceFile(SourceFile {
                sourcefile_index: 1,
            }),
        )
        .unwrap();
        assert_eq!("SourceFile", attribute.name(&pool).unwrap().as_str().unwrap());
        assert!(matches!(
            Attribute::new(&mut pool, AttributeInfo::Unknown(UnknownAttribute::default())),
            Err(ClassFileError::UnnamedAttribute)
        ));
        let unknown = Attribute::unknown(&mut pool, "VendorExt", vec![7]).unwrap();
        assert_eq!(
            [0, 2, 0, 0, 0, 1, 7].as_slice(),
            write(&unknown, &pool).as_slice()
        );
    }
}
