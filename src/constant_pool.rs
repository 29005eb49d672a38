use crate::{
    ClassBuffer, ClassFileError, ClassFileResult, ClassWriter, HandleKind, ReadOptions, Utf8Cache,
};
use derive_more::IsVariant;
use java_string::{JavaStr, JavaString};
use std::fmt::Write as _;
use std::sync::Arc;
use strum::{Display, FromRepr};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, FromRepr)]
#[repr(u8)]
pub enum ConstantPoolTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

impl ConstantPoolTag {
    pub fn from_u8(tag: u8) -> ClassFileResult<ConstantPoolTag> {
        Self::from_repr(tag).ok_or(ClassFileError::BadConstantPoolTag(tag))
    }

    /// The number of pool slots an entry with this tag occupies.
    pub fn slots(self) -> usize {
        match self {
            ConstantPoolTag::Long | ConstantPoolTag::Double => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassInfo {
    pub name_index: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StringInfo {
    pub string_index: u16,
}

/// Shared layout of `Fieldref`, `Methodref` and `InterfaceMethodref`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberRefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodHandleInfo {
    pub kind: HandleKind,
    pub reference_index: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}

/// Shared layout of `Dynamic` and `InvokeDynamic`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleInfo {
    pub name_index: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageInfo {
    pub name_index: u16,
}

#[derive(Debug, Clone, PartialEq, PartialOrd, IsVariant)]
pub enum Constant {
    Utf8(Arc<JavaString>),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(ClassInfo),
    String(StringInfo),
    FieldRef(MemberRefInfo),
    MethodRef(MemberRefInfo),
    InterfaceMethodRef(MemberRefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Dynamic(DynamicInfo),
    InvokeDynamic(DynamicInfo),
    Module(ModuleInfo),
    Package(PackageInfo),
}

impl Constant {
    pub fn utf8(value: impl Into<JavaString>) -> Constant {
        Constant::Utf8(Arc::new(value.into()))
    }

    pub fn tag(&self) -> ConstantPoolTag {
        match self {
            Constant::Utf8(_) => ConstantPoolTag::Utf8,
            Constant::Integer(_) => ConstantPoolTag::Integer,
            Constant::Float(_) => ConstantPoolTag::Float,
            Constant::Long(_) => ConstantPoolTag::Long,
            Constant::Double(_) => ConstantPoolTag::Double,
            Constant::Class(_) => ConstantPoolTag::Class,
            Constant::String(_) => ConstantPoolTag::String,
            Constant::FieldRef(_) => ConstantPoolTag::FieldRef,
            Constant::MethodRef(_) => ConstantPoolTag::MethodRef,
            Constant::InterfaceMethodRef(_) => ConstantPoolTag::InterfaceMethodRef,
            Constant::NameAndType(_) => ConstantPoolTag::NameAndType,
            Constant::MethodHandle(_) => ConstantPoolTag::MethodHandle,
            Constant::MethodType(_) => ConstantPoolTag::MethodType,
            Constant::Dynamic(_) => ConstantPoolTag::Dynamic,
            Constant::InvokeDynamic(_) => ConstantPoolTag::InvokeDynamic,
            Constant::Module(_) => ConstantPoolTag::Module,
            Constant::Package(_) => ConstantPoolTag::Package,
        }
    }

    pub fn slots(&self) -> usize {
        self.tag().slots()
    }

    fn read(buf: &mut ClassBuffer<'_>, cache: Option<&Utf8Cache>) -> ClassFileResult<Constant> {
        let tag = ConstantPoolTag::from_u8(buf.read_u8()?)?;
        let constant = match tag {
            ConstantPoolTag::Utf8 => {
                let len = buf.read_u16()? as usize;
                let bytes = buf.read_bytes(len)?;
                let value = match cache {
                    Some(cache) => cache.intern(bytes)?,
                    None => Arc::new(JavaStr::from_modified_utf8(bytes)?.into_owned()),
                };
                Constant::Utf8(value)
            }
            ConstantPoolTag::Integer => Constant::Integer(buf.read_i32()?),
            ConstantPoolTag::Float => Constant::Float(buf.read_f32()?),
            ConstantPoolTag::Long => Constant::Long(buf.read_i64()?),
            ConstantPoolTag::Double => Constant::Double(buf.read_f64()?),
            ConstantPoolTag::Class => Constant::Class(ClassInfo {
                name_index: buf.read_u16()?,
            }),
            ConstantPoolTag::String => Constant::String(StringInfo {
                string_index: buf.read_u16()?,
            }),
            ConstantPoolTag::FieldRef => Constant::FieldRef(read_member_ref(buf)?),
            ConstantPoolTag::MethodRef => Constant::MethodRef(read_member_ref(buf)?),
            ConstantPoolTag::InterfaceMethodRef => {
                Constant::InterfaceMethodRef(read_member_ref(buf)?)
            }
            ConstantPoolTag::NameAndType => Constant::NameAndType(NameAndTypeInfo {
                name_index: buf.read_u16()?,
                descriptor_index: buf.read_u16()?,
            }),
            ConstantPoolTag::MethodHandle => Constant::MethodHandle(MethodHandleInfo {
                kind: HandleKind::from_u8(buf.read_u8()?)?,
                reference_index: buf.read_u16()?,
            }),
            ConstantPoolTag::MethodType => Constant::MethodType(MethodTypeInfo {
                descriptor_index: buf.read_u16()?,
            }),
            ConstantPoolTag::Dynamic => Constant::Dynamic(read_dynamic(buf)?),
            ConstantPoolTag::InvokeDynamic => Constant::InvokeDynamic(read_dynamic(buf)?),
            ConstantPoolTag::Module => Constant::Module(ModuleInfo {
                name_index: buf.read_u16()?,
            }),
            ConstantPoolTag::Package => Constant::Package(PackageInfo {
                name_index: buf.read_u16()?,
            }),
        };
        Ok(constant)
    }

    fn write(&self, w: &mut ClassWriter) -> ClassFileResult<()> {
        w.write_u8(self.tag() as u8);
        match self {
            Constant::Utf8(value) => {
                let bytes = value.to_modified_utf8();
                w.write_count("modified utf8 bytes", bytes.len())?;
                w.write_bytes(&bytes);
            }
            Constant::Integer(value) => w.write_i32(*value),
            Constant::Float(value) => w.write_f32(*value),
            Constant::Long(value) => w.write_i64(*value),
            Constant::Double(value) => w.write_f64(*value),
            Constant::Class(info) => w.write_u16(info.name_index),
            Constant::String(info) => w.write_u16(info.string_index),
            Constant::FieldRef(info)
            | Constant::MethodRef(info)
            | Constant::InterfaceMethodRef(info) => {
                w.write_u16(info.class_index);
                w.write_u16(info.name_and_type_index);
            }
            Constant::NameAndType(info) => {
                w.write_u16(info.name_index);
                w.write_u16(info.descriptor_index);
            }
            Constant::MethodHandle(info) => {
                w.write_u8(info.kind as u8);
                w.write_u16(info.reference_index);
            }
            Constant::MethodType(info) => w.write_u16(info.descriptor_index),
            Constant::Dynamic(info) | Constant::InvokeDynamic(info) => {
                w.write_u16(info.bootstrap_method_attr_index);
                w.write_u16(info.name_and_type_index);
            }
            Constant::Module(info) => w.write_u16(info.name_index),
            Constant::Package(info) => w.write_u16(info.name_index),
        }
        Ok(())
    }
}

fn read_member_ref(buf: &mut ClassBuffer<'_>) -> ClassFileResult<MemberRefInfo> {
    Ok(MemberRefInfo {
        class_index: buf.read_u16()?,
        name_and_type_index: buf.read_u16()?,
    })
}

fn read_dynamic(buf: &mut ClassBuffer<'_>) -> ClassFileResult<DynamicInfo> {
    Ok(DynamicInfo {
        bootstrap_method_attr_index: buf.read_u16()?,
        name_and_type_index: buf.read_u16()?,
    })
}

/// A field, method or interface method reference with every index resolved.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberRef<'pool> {
    pub tag: ConstantPoolTag,
    pub owner: &'pool JavaStr,
    pub name: &'pool JavaStr,
    pub desc: &'pool JavaStr,
}

/// The constant pool of a class.
///
/// Slot 0 is never populated, and neither is the slot following a `Long` or `Double`. Both are
/// kept as empty slots so that indices line up with the class file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPool {
    entries: Vec<Option<Constant>>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        ConstantPool::new()
    }
}

impl ConstantPool {
    pub fn new() -> ConstantPool {
        ConstantPool {
            entries: vec![None],
        }
    }

    pub(crate) fn read(
        buf: &mut ClassBuffer<'_>,
        options: &ReadOptions,
    ) -> ClassFileResult<ConstantPool> {
        let constant_pool_count = buf.read_u16()? as usize;
        if constant_pool_count == 0 {
            return Err(ClassFileError::EmptyConstantPool);
        }

        let cache = options.utf8_cache.as_deref();
        let mut entries = Vec::with_capacity(constant_pool_count);
        entries.push(None);
        while entries.len() < constant_pool_count {
            let index = entries.len();
            let constant = Constant::read(buf, cache)?;
            let slots = constant.slots();
            if index + slots > constant_pool_count {
                return Err(ClassFileError::TruncatedWideConstant(index as u16));
            }
            entries.push(Some(constant));
            if slots == 2 {
                entries.push(None);
            }
        }

        Ok(ConstantPool { entries })
    }

    pub(crate) fn write(&self, w: &mut ClassWriter) -> ClassFileResult<()> {
        w.write_count("constant pool slots", self.entries.len())?;
        for constant in self.entries.iter().flatten() {
            constant.write(w)?;
        }
        Ok(())
    }

    /// The `constant_pool_count` of the class file: one more than the highest usable index.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, index: u16) -> ClassFileResult<&Constant> {
        match self.entries.get(index as usize) {
            Some(Some(constant)) => Ok(constant),
            Some(None) => Err(ClassFileError::BadConstantPoolIndexNoEntry(index)),
            None => Err(ClassFileError::BadConstantPoolIndex {
                index,
                len: self.entries.len(),
            }),
        }
    }

    pub fn get_optional(&self, index: u16) -> ClassFileResult<Option<&Constant>> {
        if index == 0 {
            return Ok(None);
        }

        self.get(index).map(Some)
    }

    pub fn get_type(&self, index: u16) -> ClassFileResult<ConstantPoolTag> {
        self.get(index).map(Constant::tag)
    }

    /// Iterates over every populated slot, skipping slot 0 and the gaps after 8-byte constants.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.as_ref().map(|constant| (index as u16, constant)))
    }

    /// Appends a constant, returning its index. `Long` and `Double` also reserve the next slot.
    pub fn add(&mut self, constant: Constant) -> ClassFileResult<u16> {
        let index = self.entries.len();
        let count = index + constant.slots();
        if count > u16::MAX as usize {
            return Err(ClassFileError::TooManyEntries {
                what: "constant pool slots",
                count,
                max: u16::MAX as usize,
            });
        }

        let wide = constant.slots() == 2;
        self.entries.push(Some(constant));
        if wide {
            self.entries.push(None);
        }
        Ok(index as u16)
    }

    pub fn find(&self, constant: &Constant) -> Option<u16> {
        self.iter()
            .find(|(_, existing)| *existing == constant)
            .map(|(index, _)| index)
    }

    /// Returns the index of an equal constant, adding one if there is none.
    pub fn find_or_add(&mut self, constant: Constant) -> ClassFileResult<u16> {
        match self.find(&constant) {
            Some(index) => Ok(index),
            None => self.add(constant),
        }
    }

    pub fn add_utf8(&mut self, value: impl Into<JavaString>) -> ClassFileResult<u16> {
        self.find_or_add(Constant::utf8(value))
    }

    pub fn add_class(&mut self, name: impl Into<JavaString>) -> ClassFileResult<u16> {
        let name_index = self.add_utf8(name)?;
        self.find_or_add(Constant::Class(ClassInfo { name_index }))
    }

    pub fn add_name_and_type(
        &mut self,
        name: impl Into<JavaString>,
        desc: impl Into<JavaString>,
    ) -> ClassFileResult<u16> {
        let name_index = self.add_utf8(name)?;
        let descriptor_index = self.add_utf8(desc)?;
        self.find_or_add(Constant::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    /// Replaces the constant at `index`. The replacement must occupy as many slots as the
    /// constant it replaces, so that no other index shifts.
    pub fn set(&mut self, index: u16, constant: Constant) -> ClassFileResult<Constant> {
        let slots = self.get(index)?.slots();
        if slots != constant.slots() {
            return Err(ClassFileError::ConstantSlotMismatch {
                index,
                expected: slots,
                actual: constant.slots(),
            });
        }

        match self.entries.get_mut(index as usize) {
            Some(Some(existing)) => Ok(std::mem::replace(existing, constant)),
            _ => Err(ClassFileError::BadConstantPoolIndexNoEntry(index)),
        }
    }

    pub fn class_name(&self, index: u16) -> ClassFileResult<&JavaStr> {
        self.get_utf8(self.get_class(index)?.name_index)
    }

    pub fn optional_class_name(&self, index: u16) -> ClassFileResult<Option<&JavaStr>> {
        if index == 0 {
            return Ok(None);
        }
        self.class_name(index).map(Some)
    }

    pub fn string_value(&self, index: u16) -> ClassFileResult<&JavaStr> {
        self.get_utf8(self.get_string(index)?.string_index)
    }

    /// Resolves a `NameAndType` to its name and descriptor.
    pub fn name_and_type(&self, index: u16) -> ClassFileResult<(&JavaStr, &JavaStr)> {
        let info = self.get_name_and_type(index)?;
        Ok((
            self.get_utf8(info.name_index)?,
            self.get_utf8(info.descriptor_index)?,
        ))
    }

    /// Resolves any of the three member reference kinds.
    pub fn member_ref(&self, index: u16) -> ClassFileResult<MemberRef<'_>> {
        let info = match self.get(index)? {
            Constant::FieldRef(info)
            | Constant::MethodRef(info)
            | Constant::InterfaceMethodRef(info) => info,
            other => {
                return Err(ClassFileError::BadConstantPoolType {
                    index,
                    expected: ConstantPoolTag::MethodRef,
                    actual: other.tag(),
                })
            }
        };
        let (name, desc) = self.name_and_type(info.name_and_type_index)?;
        Ok(MemberRef {
            tag: self.get_type(index)?,
            owner: self.class_name(info.class_index)?,
            name,
            desc,
        })
    }

    /// Resolves a `MethodHandle`, checking that its reference has the kind the handle requires.
    pub fn method_handle_ref(&self, index: u16) -> ClassFileResult<(HandleKind, MemberRef<'_>)> {
        let handle = self.get_method_handle(index)?;
        let member = self.member_ref(handle.reference_index)?;
        if !handle.kind.accepts(member.tag) {
            let expected = if handle.kind.is_field_access() {
                ConstantPoolTag::FieldRef
            } else {
                ConstantPoolTag::MethodRef
            };
            return Err(ClassFileError::BadConstantPoolType {
                index: handle.reference_index,
                expected,
                actual: member.tag,
            });
        }
        Ok((handle.kind, member))
    }

    /// A human readable rendering of a constant, for diagnostics.
    pub fn constant_to_string(&self, index: u16) -> ClassFileResult<String> {
        let mut out = String::new();
        // writing to a String can't fail
        let _ = match self.get(index)? {
            Constant::Utf8(value) => write!(out, "{value}"),
            Constant::Integer(value) => write!(out, "{value}"),
            Constant::Float(value) => write!(out, "{value}f"),
            Constant::Long(value) => write!(out, "{value}L"),
            Constant::Double(value) => write!(out, "{value}d"),
            Constant::Class(_) => write!(out, "{}", self.class_name(index)?),
            Constant::String(_) => write!(out, "\"{}\"", self.string_value(index)?),
            Constant::FieldRef(_) | Constant::MethodRef(_) | Constant::InterfaceMethodRef(_) => {
                let member = self.member_ref(index)?;
                write!(out, "{}.{} {}", member.owner, member.name, member.desc)
            }
            Constant::NameAndType(_) => {
                let (name, desc) = self.name_and_type(index)?;
                write!(out, "{name} {desc}")
            }
            Constant::MethodHandle(info) => {
                let member = self.member_ref(info.reference_index)?;
                write!(
                    out,
                    "{} {}.{} {}",
                    info.kind, member.owner, member.name, member.desc
                )
            }
            Constant::MethodType(info) => write!(out, "{}", self.get_utf8(info.descriptor_index)?),
            Constant::Dynamic(info) | Constant::InvokeDynamic(info) => {
                let (name, desc) = self.name_and_type(info.name_and_type_index)?;
                write!(out, "#{}:{name} {desc}", info.bootstrap_method_attr_index)
            }
            Constant::Module(info) => write!(out, "{}", self.get_utf8(info.name_index)?),
            Constant::Package(info) => write!(out, "{}", self.get_utf8(info.name_index)?),
        };
        Ok(out)
    }
}

macro_rules! generate_getters {
    ($($tag:ident, $getter:ident, $opt_getter:ident: $ty:ty => |$value:ident| $convert:expr;)*) => {
        impl ConstantPool {
            $(
            pub fn $getter(&self, index: u16) -> ClassFileResult<$ty> {
                match self.get(index)? {
                    Constant::$tag($value) => Ok($convert),
                    other => Err(ClassFileError::BadConstantPoolType {
                        index,
                        expected: ConstantPoolTag::$tag,
                        actual: other.tag(),
                    }),
                }
            }

            pub fn $opt_getter(&self, index: u16) -> ClassFileResult<Option<$ty>> {
                if index == 0 {
                    return Ok(None);
                }
                self.$getter(index).map(Some)
            }
            )*
        }
    }
}

generate_getters! {
    Utf8, get_utf8, get_optional_utf8: &JavaStr => |value| &***value;
    Integer, get_i32, get_optional_i32: i32 => |value| *value;
    Float, get_f32, get_optional_f32: f32 => |value| *value;
    Long, get_i64, get_optional_i64: i64 => |value| *value;
    Double, get_f64, get_optional_f64: f64 => |value| *value;
    Class, get_class, get_optional_class: ClassInfo => |value| *value;
    String, get_string, get_optional_string: StringInfo => |value| *value;
    FieldRef, get_field_ref, get_optional_field_ref: MemberRefInfo => |value| *value;
    MethodRef, get_method_ref, get_optional_method_ref: MemberRefInfo => |value| *value;
    InterfaceMethodRef, get_interface_method_ref, get_optional_interface_method_ref: MemberRefInfo => |value| *value;
    NameAndType, get_name_and_type, get_optional_name_and_type: NameAndTypeInfo => |value| *value;
    MethodHandle, get_method_handle, get_optional_method_handle: MethodHandleInfo => |value| *value;
    MethodType, get_method_type, get_optional_method_type: MethodTypeInfo => |value| *value;
    Dynamic, get_dynamic, get_optional_dynamic: DynamicInfo => |value| *value;
    InvokeDynamic, get_invoke_dynamic, get_optional_invoke_dynamic: DynamicInfo => |value| *value;
    Module, get_module, get_optional_module: ModuleInfo => |value| *value;
    Package, get_package, get_optional_package: PackageInfo => |value| *value;
}

impl<'a> IntoIterator for &'a ConstantPool {
    type Item = (u16, &'a Constant);
    type IntoIter = Box<dyn Iterator<Item = (u16, &'a Constant)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        ClassBuffer, ClassFileError, ClassInfo, ClassWriter, Constant, ConstantPool,
        ConstantPoolTag, ErrorKind, HandleKind, MethodHandleInfo, ReadOptions, Utf8Cache,
    };
    use java_string::JavaStr;
    use std::sync::Arc;

    fn read_pool(bytes: &[u8], options: &ReadOptions) -> ConstantPool {
        let mut buf = ClassBuffer::new(bytes);
        let pool = ConstantPool::read(&mut buf, options).unwrap();
        assert!(buf.is_empty());
        pool
    }

    fn write_pool(pool: &ConstantPool) -> Vec<u8> {
        let mut writer = ClassWriter::new();
        pool.write(&mut writer).unwrap();
        writer.into_bytes()
    }

    const LONG_POOL: &[u8] = &[0, 3, 5, 0, 0, 0, 0, 0, 0, 0, 5];

    #[test]
    fn test_long_occupies_two_slots() {
        let pool = read_pool(LONG_POOL, &ReadOptions::default());
        assert_eq!(3, pool.count());
        assert_eq!(5, pool.get_i64(1).unwrap());
        assert!(matches!(
            pool.get(2),
            Err(ClassFileError::BadConstantPoolIndexNoEntry(2))
        ));
        assert_eq!(LONG_POOL, write_pool(&pool).as_slice());
    }

    #[test]
    fn test_index_bounds() {
        let pool = read_pool(LONG_POOL, &ReadOptions::default());
        let zero = pool.get(0).unwrap_err();
        assert!(matches!(zero, ClassFileError::BadConstantPoolIndexNoEntry(0)));
        assert_eq!(ErrorKind::CallerMisuse, zero.kind());
        assert!(matches!(
            pool.get(3),
            Err(ClassFileError::BadConstantPoolIndex { index: 3, len: 3 })
        ));
        assert_eq!(None, pool.get_optional_i64(0).unwrap());
        assert_eq!(vec![1], pool.iter().map(|(index, _)| index).collect::<Vec<_>>());
    }

    #[test]
    fn test_tag_mismatch() {
        let pool = read_pool(LONG_POOL, &ReadOptions::default());
        let err = pool.get_utf8(1).unwrap_err();
        assert!(matches!(
            err,
            ClassFileError::BadConstantPoolType {
                index: 1,
                expected: ConstantPoolTag::Utf8,
                actual: ConstantPoolTag::Long,
            }
        ));
        assert_eq!(ErrorKind::CallerMisuse, err.kind());
    }

    #[test]
    fn test_wide_constant_in_last_slot() {
        let mut buf = ClassBuffer::new(&[0, 2, 6, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(
            ConstantPool::read(&mut buf, &ReadOptions::default()),
            Err(ClassFileError::TruncatedWideConstant(1))
        ));
    }

    #[test]
    fn test_empty_pool_count() {
        let mut buf = ClassBuffer::new(&[0, 0]);
        assert!(matches!(
            ConstantPool::read(&mut buf, &ReadOptions::default()),
            Err(ClassFileError::EmptyConstantPool)
        ));
    }

    #[test]
    fn test_unknown_tag() {
        let mut buf = ClassBuffer::new(&[0, 2, 2, 0, 0]);
        assert!(matches!(
            ConstantPool::read(&mut buf, &ReadOptions::default()),
            Err(ClassFileError::BadConstantPoolTag(2))
        ));
    }

    #[test]
    fn test_add_and_resolve() {
        let mut pool = ConstantPool::new();
        let object = pool.add_class("java/lang/Object").unwrap();
        assert_eq!(2, object);
        assert_eq!(object, pool.add_class("java/lang/Object").unwrap());
        let long = pool.add(Constant::Long(-1)).unwrap();
        assert_eq!(3, long);
        let after = pool.add_utf8("after").unwrap();
        assert_eq!(5, after);
        assert_eq!(6, pool.count());
        assert_eq!(JavaStr::from_str("java/lang/Object"), pool.class_name(object).unwrap());
        assert_eq!("java/lang/Object", pool.constant_to_string(object).unwrap());
        assert_eq!("-1L", pool.constant_to_string(long).unwrap());

        let bytes = write_pool(&pool);
        assert_eq!(pool, read_pool(&bytes, &ReadOptions::default()));
    }

    #[test]
    fn test_set_keeps_slot_width() {
        let mut pool = ConstantPool::new();
        let index = pool.add(Constant::Integer(1)).unwrap();
        assert!(matches!(
            pool.set(index, Constant::Long(1)),
            Err(ClassFileError::ConstantSlotMismatch { .. })
        ));
        assert_eq!(Constant::Integer(1), pool.set(index, Constant::Integer(2)).unwrap());
        assert_eq!(2, pool.get_i32(index).unwrap());
    }

    #[test]
    fn test_method_handle_kind_checked() {
        let mut pool = ConstantPool::new();
        let owner = pool.add_class("Foo").unwrap();
        let name_and_type = pool.add_name_and_type("bar", "()V").unwrap();
        let field = pool
            .add(Constant::FieldRef(crate::MemberRefInfo {
                class_index: owner,
                name_and_type_index: name_and_type,
            }))
            .unwrap();
        let good = pool
            .add(Constant::MethodHandle(MethodHandleInfo {
                kind: HandleKind::GetStatic,
                reference_index: field,
            }))
            .unwrap();
        let bad = pool
            .add(Constant::MethodHandle(MethodHandleInfo {
                kind: HandleKind::InvokeStatic,
                reference_index: field,
            }))
            .unwrap();

        let (kind, member) = pool.method_handle_ref(good).unwrap();
        assert_eq!(HandleKind::GetStatic, kind);
        assert_eq!(JavaStr::from_str("bar"), member.name);
        assert!(pool.method_handle_ref(bad).is_err());
        assert!(pool.get_class(good).is_err());
        assert_eq!(ClassInfo { name_index: 1 }, pool.get_class(owner).unwrap());
    }

    #[test]
    fn test_utf8_cache_shares_values() {
        let cache = Arc::new(Utf8Cache::new(16));
        let options = ReadOptions::default().with_utf8_cache(Arc::clone(&cache));
        let bytes = [0, 2, 1, 0, 3, b'f', b'o', b'o'];
        let first = read_pool(&bytes, &options);
        let second = read_pool(&bytes, &options);
        let (Constant::Utf8(a), Constant::Utf8(b)) =
            (first.get(1).unwrap(), second.get(1).unwrap())
        else {
            panic!("expected utf8 constants");
        };
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(first, second);
        assert_eq!(1, cache.stats().hits);
    }
}
