//! In-memory class pool
//!
//! A [`ClassModel`] provider backed by class definitions loaded from JSON,
//! the way a class-file dump tool would describe them:
//!
//! ```json
//! {
//!   "classes": [
//!     {
//!       "name": "com.example.Screen1",
//!       "superclass": "android.app.Activity",
//!       "annotations": ["com.github.stephanenicolas.loglifecycle.LogLifeCycle"],
//!       "methods": [
//!         { "name": "onCreate", "descriptor": "(Landroid/os/Bundle;)V", "access_flags": 1 }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Every supertype must be present, either in the file or via
//! [`ClassPool::with_framework_stubs`]. `java.lang.Object` is implicit.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::Path;

use crate::category::Category;
use crate::model::{
    ClassModel, MethodDescriptor, MethodOrigin, ResolutionError, ACC_PRIVATE, ACC_PROTECTED,
    ACC_PUBLIC,
};

/// Implicit root of every hierarchy
pub const OBJECT_CLASS: &str = "java.lang.Object";

/// Method as stored in the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub access_flags: u16,
}

impl MethodDef {
    pub fn new(name: &str, descriptor: &str, access_flags: u16) -> Self {
        Self {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access_flags,
        }
    }

    fn to_descriptor(&self, origin: MethodOrigin) -> MethodDescriptor {
        MethodDescriptor::from_access_flags(
            self.name.clone(),
            self.descriptor.clone(),
            self.access_flags,
            origin,
        )
    }

    fn is_private(&self) -> bool {
        self.access_flags & ACC_PRIVATE != 0
    }
}

/// Class as stored in the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    /// `None` means the class extends `java.lang.Object`
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_string());
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn annotated(mut self, annotation: &str) -> Self {
        self.annotations.push(annotation.to_string());
        self
    }

    pub fn method(mut self, name: &str, descriptor: &str, access_flags: u16) -> Self {
        self.methods.push(MethodDef::new(name, descriptor, access_flags));
        self
    }

    /// Direct supertypes, superclass first
    fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.superclass
            .as_deref()
            .into_iter()
            .chain(self.interfaces.iter().map(String::as_str))
    }
}

#[derive(Debug, Deserialize)]
struct PoolFile {
    classes: Vec<ClassDef>,
}

/// Lifecycle callbacks registered on the framework stubs
fn stub_callbacks(category: Category) -> &'static [(&'static str, &'static str)] {
    match category {
        Category::Application => &[
            ("onCreate", "()V"),
            ("onTerminate", "()V"),
            ("onLowMemory", "()V"),
            ("onTrimMemory", "(I)V"),
        ],
        Category::Screen => &[
            ("onCreate", "(Landroid/os/Bundle;)V"),
            ("onStart", "()V"),
            ("onRestart", "()V"),
            ("onResume", "()V"),
            ("onPause", "()V"),
            ("onStop", "()V"),
            ("onDestroy", "()V"),
            ("onSaveInstanceState", "(Landroid/os/Bundle;)V"),
        ],
        Category::Fragment | Category::CompatFragment => &[
            ("onAttach", "(Landroid/content/Context;)V"),
            ("onCreate", "(Landroid/os/Bundle;)V"),
            (
                "onCreateView",
                "(Landroid/view/LayoutInflater;Landroid/view/ViewGroup;Landroid/os/Bundle;)Landroid/view/View;",
            ),
            ("onStart", "()V"),
            ("onResume", "()V"),
            ("onPause", "()V"),
            ("onStop", "()V"),
            ("onDestroyView", "()V"),
            ("onDestroy", "()V"),
            ("onDetach", "()V"),
        ],
        Category::View => &[
            ("onAttachedToWindow", "()V"),
            ("onDetachedFromWindow", "()V"),
            ("onMeasure", "(II)V"),
            ("onLayout", "(ZIIII)V"),
            ("onDraw", "(Landroid/graphics/Canvas;)V"),
        ],
        Category::Service => &[
            ("onCreate", "()V"),
            ("onStartCommand", "(Landroid/content/Intent;II)I"),
            ("onBind", "(Landroid/content/Intent;)Landroid/os/IBinder;"),
            ("onUnbind", "(Landroid/content/Intent;)Z"),
            ("onDestroy", "()V"),
        ],
        Category::BroadcastReceiver => {
            &[("onReceive", "(Landroid/content/Context;Landroid/content/Intent;)V")]
        }
        Category::ContentProvider => &[("onCreate", "()Z"), ("onLowMemory", "()V")],
    }
}

/// Pool of class definitions, keyed by fully qualified name
#[derive(Debug, Clone, Default)]
pub struct ClassPool {
    classes: HashMap<String, ClassDef>,
}

impl ClassPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool pre-populated with the eight framework component base classes
    pub fn with_framework_stubs() -> Self {
        let mut pool = Self::new();
        for category in Category::ALL {
            // The platform Activity's own callbacks are protected; the rest are public.
            let access = match category {
                Category::Screen => ACC_PROTECTED,
                _ => ACC_PUBLIC,
            };
            let mut def = ClassDef::new(category.base_class());
            for (name, descriptor) in stub_callbacks(category) {
                def = def.method(name, descriptor, access);
            }
            pool.insert(def);
        }
        pool
    }

    /// Load class definitions from a JSON file into this pool
    pub fn load_json_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("Class pool file not found: {}", path.display());
        }
        let contents = fs::read_to_string(path).context("Failed to read class pool file")?;
        self.load_json_str(&contents)
            .with_context(|| format!("Invalid class pool {}", path.display()))
    }

    /// Load class definitions from JSON text into this pool
    pub fn load_json_str(&mut self, contents: &str) -> Result<()> {
        let file: PoolFile = serde_json::from_str(contents).context("Invalid class pool JSON")?;
        let mut seen = HashSet::new();
        for class in &file.classes {
            if !seen.insert(class.name.as_str()) {
                bail!("Duplicate class definition: {}", class.name);
            }
        }
        for class in file.classes {
            self.insert(class);
        }
        Ok(())
    }

    /// Add or replace a class definition
    pub fn insert(&mut self, class: ClassDef) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// All class names, sorted
    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of classes carrying the given annotation, sorted
    pub fn annotated_with(&self, annotation: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .classes
            .values()
            .filter(|c| c.annotations.iter().any(|a| a == annotation))
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Resolve a class handle
    pub fn get(&self, name: &str) -> Option<PooledClass<'_>> {
        self.classes.get(name).map(|def| PooledClass { pool: self, def })
    }

    fn lookup(&self, name: &str, referenced_by: &str) -> Result<&ClassDef, ResolutionError> {
        self.classes
            .get(name)
            .ok_or_else(|| ResolutionError::ClassNotFound {
                class: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })
    }

    /// Visit every proper supertype of `def` once, nearest first
    ///
    /// Stops early and returns `true` as soon as `visit` returns `true`.
    /// Supertypes beyond the stopping point are never resolved.
    fn walk_ancestors<'a>(
        &'a self,
        def: &'a ClassDef,
        mut visit: impl FnMut(&'a ClassDef) -> bool,
    ) -> Result<bool, ResolutionError> {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(def.name.as_str());
        let mut queue: VecDeque<(&str, &str)> =
            def.supertypes().map(|s| (s, def.name.as_str())).collect();
        while let Some((name, referenced_by)) = queue.pop_front() {
            if name == OBJECT_CLASS || !visited.insert(name) {
                continue;
            }
            let parent = self.lookup(name, referenced_by)?;
            if visit(parent) {
                return Ok(true);
            }
            queue.extend(parent.supertypes().map(|s| (s, parent.name.as_str())));
        }
        Ok(false)
    }
}

/// Handle to one class of a [`ClassPool`]
#[derive(Debug, Clone, Copy)]
pub struct PooledClass<'a> {
    pool: &'a ClassPool,
    def: &'a ClassDef,
}

impl<'a> PooledClass<'a> {
    pub fn definition(&self) -> &'a ClassDef {
        self.def
    }
}

impl ClassModel for PooledClass<'_> {
    fn name(&self) -> &str {
        &self.def.name
    }

    fn has_annotation(&self, annotation: &str) -> bool {
        self.def.annotations.iter().any(|a| a == annotation)
    }

    fn is_subtype_of(&self, type_name: &str) -> Result<bool, ResolutionError> {
        if self.def.name == type_name || type_name == OBJECT_CLASS {
            return Ok(true);
        }
        self.pool.walk_ancestors(self.def, |a| a.name == type_name)
    }

    fn declared_methods(&self) -> Result<Vec<MethodDescriptor>, ResolutionError> {
        Ok(self
            .def
            .methods
            .iter()
            .map(|m| m.to_descriptor(MethodOrigin::Declared))
            .collect())
    }

    fn all_methods(&self) -> Result<Vec<MethodDescriptor>, ResolutionError> {
        let mut methods = self.declared_methods()?;
        self.pool.walk_ancestors(self.def, |ancestor| {
            methods.extend(ancestor.methods.iter().filter(|m| !m.is_private()).map(|m| {
                m.to_descriptor(MethodOrigin::Inherited {
                    owner: ancestor.name.clone(),
                })
            }));
            false
        })?;
        Ok(methods)
    }
}
