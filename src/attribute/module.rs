use crate::attribute::Payload;
use crate::{
    ClassBuffer, ClassFileResult, ClassWriter, ConstantPool, ModuleAccess, ModuleRelationAccess,
    ModuleRequireAccess,
};
use java_string::JavaStr;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ModuleRequire {
    /// Index of a `Module` constant.
    pub requires_index: u16,
    pub flags: ModuleRequireAccess,
    /// Zero if no version was recorded.
    pub requires_version_index: u16,
}

/// An `exports` or `opens` directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleRelation {
    /// Index of a `Package` constant.
    pub package_index: u16,
    pub flags: ModuleRelationAccess,
    /// `Module` constants the package is exported or opened to; empty if unqualified.
    pub to_indices: Vec<u16>,
}

impl ModuleRelation {
    fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<ModuleRelation> {
        Ok(ModuleRelation {
            package_index: buf.read_u16()?,
            flags: ModuleRelationAccess::from_bits_retain(buf.read_u16()?),
            to_indices: buf.read_vec(ClassBuffer::read_u16)?,
        })
    }

    fn write(&self, w: &mut ClassWriter) -> ClassFileResult<()> {
        w.write_u16(self.package_index);
        w.write_u16(self.flags.bits());
        write_indices(w, "module targets", &self.to_indices)
    }

    fn encoded_len(&self) -> usize {
        6 + 2 * self.to_indices.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleProvide {
    /// Index of the `Class` constant of the service interface.
    pub provides_index: u16,
    pub provides_with_indices: Vec<u16>,
}

fn write_indices(w: &mut ClassWriter, what: &'static str, indices: &[u16]) -> ClassFileResult<()> {
    w.write_vec(what, indices, |w, index| {
        w.write_u16(*index);
        Ok(())
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Module {
    /// Index of a `Module` constant.
    pub module_name_index: u16,
    pub module_flags: ModuleAccess,
    pub module_version_index: u16,
    pub requires: Vec<ModuleRequire>,
    pub exports: Vec<ModuleRelation>,
    pub opens: Vec<ModuleRelation>,
    /// `Class` constants of the services this module uses.
    pub uses_index: Vec<u16>,
    pub provides: Vec<ModuleProvide>,
}

impl Module {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<Module> {
        Ok(Module {
            module_name_index: buf.read_u16()?,
            module_flags: ModuleAccess::from_bits_retain(buf.read_u16()?),
            module_version_index: buf.read_u16()?,
            requires: buf.read_vec(|buf| {
                Ok(ModuleRequire {
                    requires_index: buf.read_u16()?,
                    flags: ModuleRequireAccess::from_bits_retain(buf.read_u16()?),
                    requires_version_index: buf.read_u16()?,
                })
            })?,
            exports: buf.read_vec(ModuleRelation::read)?,
            opens: buf.read_vec(ModuleRelation::read)?,
            uses_index: buf.read_vec(ClassBuffer::read_u16)?,
            provides: buf.read_vec(|buf| {
                Ok(ModuleProvide {
                    provides_index: buf.read_u16()?,
                    provides_with_indices: buf.read_vec(ClassBuffer::read_u16)?,
                })
            })?,
        })
    }

    /// The module name, resolved through its `Module` constant.
    pub fn name<'pool>(&self, pool: &'pool ConstantPool) -> ClassFileResult<&'pool JavaStr> {
        pool.get_utf8(pool.get_module(self.module_name_index)?.name_index)
    }
}

impl Payload for Module {
    fn payload_len(&self) -> usize {
        2 + 2
            + 2
            + 2
            + 6 * self.requires.len()
            + 2
            + self
                .exports
                .iter()
                .map(ModuleRelation::encoded_len)
                .sum::<usize>()
            + 2
            + self
                .opens
                .iter()
                .map(ModuleRelation::encoded_len)
                .sum::<usize>()
            + 2
            + 2 * self.uses_index.len()
            + 2
            + self
                .provides
                .iter()
                .map(|provide| 4 + 2 * provide.provides_with_indices.len())
                .sum::<usize>()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_u16(self.module_name_index);
        w.write_u16(self.module_flags.bits());
        w.write_u16(self.module_version_index);
        w.write_vec("requires", &self.requires, |w, require| {
            w.write_u16(require.requires_index);
            w.write_u16(require.flags.bits());
            w.write_u16(require.requires_version_index);
            Ok(())
        })?;
        w.write_vec("exports", &self.exports, |w, export| export.write(w))?;
        w.write_vec("opens", &self.opens, |w, open| open.write(w))?;
        write_indices(w, "uses", &self.uses_index)?;
        w.write_vec("provides", &self.provides, |w, provide| {
            w.write_u16(provide.provides_index);
            write_indices(w, "service implementations", &provide.provides_with_indices)
        })
    }
}

/// Every package of a module, as `Package` constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ModulePackages {
    pub package_index: Vec<u16>,
}

impl ModulePackages {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<ModulePackages> {
        Ok(ModulePackages {
            package_index: buf.read_vec(ClassBuffer::read_u16)?,
        })
    }
}

impl Payload for ModulePackages {
    fn payload_len(&self) -> usize {
        2 + 2 * self.package_index.len()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        write_indices(w, "module packages", &self.package_index)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ModuleMainClass {
    pub main_class_index: u16,
}

impl ModuleMainClass {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<ModuleMainClass> {
        Ok(ModuleMainClass {
            main_class_index: buf.read_u16()?,
        })
    }
}

impl Payload for ModuleMainClass {
    fn payload_len(&self) -> usize {
        2
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_u16(self.main_class_index);
        Ok(())
    }
}
