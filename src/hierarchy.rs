use crate::{ClassFileError, ClassFileResult, JavaClass};
use java_string::{JavaStr, JavaString};
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::BuildHasher;

/// Resolves class names (in internal form, such as `java/lang/Object`) to parsed classes.
pub trait ClassLookup {
    fn lookup_class(&self, name: &JavaStr) -> Option<&JavaClass>;
}

impl<S: BuildHasher> ClassLookup for HashMap<JavaString, JavaClass, S> {
    fn lookup_class(&self, name: &JavaStr) -> Option<&JavaClass> {
        self.get(name)
    }
}

/// Keys each class by its own name, for use as a [`ClassLookup`].
pub fn index_classes(
    classes: impl IntoIterator<Item = JavaClass>,
) -> ClassFileResult<HashMap<JavaString, JavaClass>> {
    classes
        .into_iter()
        .map(|class| Ok((class.class_name()?.to_owned(), class)))
        .collect()
}

fn resolve<'a>(lookup: &'a impl ClassLookup, name: &JavaStr) -> ClassFileResult<&'a JavaClass> {
    lookup
        .lookup_class(name)
        .ok_or_else(|| ClassFileError::ClassNotFound(name.to_owned()))
}

impl JavaClass {
    /// The superclass chain, nearest first, ending with the class that has no superclass.
    ///
    /// Fails with [`ClassFileError::ClassCircularity`] if a class is reached twice.
    pub fn super_classes<'a>(
        &'a self,
        lookup: &'a impl ClassLookup,
    ) -> ClassFileResult<Vec<&'a JavaClass>> {
        let mut visited = HashSet::new();
        visited.insert(self.class_name()?);

        let mut result = Vec::new();
        let mut current = self;
        while let Some(name) = current.super_class_name()? {
            if !visited.insert(name) {
                tracing::warn!(%name, "circular superclass chain");
                return Err(ClassFileError::ClassCircularity(name.to_owned()));
            }
            current = resolve(lookup, name)?;
            result.push(current);
        }
        Ok(result)
    }

    /// Every interface this class implements, directly or through its superclasses and
    /// superinterfaces. Each appears once, in breadth-first order.
    ///
    /// Loops in the graph are walked once and do not cause an error.
    pub fn all_interfaces<'a>(
        &'a self,
        lookup: &'a impl ClassLookup,
    ) -> ClassFileResult<Vec<&'a JavaClass>> {
        let mut visited = HashSet::new();
        visited.insert(self.class_name()?);
        let mut queue = VecDeque::from([self]);
        let mut result = Vec::new();

        while let Some(class) = queue.pop_front() {
            let supertypes = class
                .super_class_name()?
                .into_iter()
                .chain(class.interface_names()?);
            for name in supertypes {
                if !visited.insert(name) {
                    continue;
                }
                let supertype = resolve(lookup, name)?;
                if supertype.is_interface() {
                    result.push(supertype);
                }
                queue.push_back(supertype);
            }
        }
        Ok(result)
    }

    pub fn is_subclass_of(&self, name: &str, lookup: &impl ClassLookup) -> ClassFileResult<bool> {
        let name = JavaStr::from_str(name);
        for class in self.super_classes(lookup)? {
            if class.class_name()? == name {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn implements(&self, name: &str, lookup: &impl ClassLookup) -> ClassFileResult<bool> {
        let name = JavaStr::from_str(name);
        for interface in self.all_interfaces(lookup)? {
            if interface.class_name()? == name {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
