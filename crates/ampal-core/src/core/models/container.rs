use super::assembly::Assembly;
use super::atom::Atom;
use super::error::ModelError;
use super::tags::Tags;
use nalgebra::{Point3, Rotation3, Vector3};

/// An ordered collection of assemblies, one per model of a multi-model file.
///
/// Every assembly is expected to share the chain topology of the first one;
/// only coordinates differ between models.
#[derive(Debug, Clone, Default)]
pub struct Container {
    pub id: String,
    pub tags: Tags,
    assemblies: Vec<Assembly>,
}

impl Container {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn push(&mut self, assembly: Assembly) {
        self.assemblies.push(assembly);
    }

    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    pub fn assemblies(&self) -> &[Assembly] {
        &self.assemblies
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assembly> {
        self.assemblies.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Assembly> {
        self.assemblies.iter_mut()
    }

    pub fn into_assemblies(self) -> Vec<Assembly> {
        self.assemblies
    }

    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] if `index` is past the end.
    pub fn get(&self, index: usize) -> Result<&Assembly, ModelError> {
        self.assemblies.get(index).ok_or(ModelError::IndexOutOfRange {
            kind: "assembly",
            index,
            len: self.assemblies.len(),
        })
    }

    /// Finds an assembly by its full id, or by its model number (the `n` of an
    /// id ending in `_state_n`).
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingKey`] if no assembly matches.
    pub fn find(&self, key: &str) -> Result<&Assembly, ModelError> {
        let suffix = format!("_state_{}", key);
        self.assemblies
            .iter()
            .find(|a| a.id == key)
            .or_else(|| self.assemblies.iter().find(|a| a.id.ends_with(&suffix)))
            .ok_or_else(|| ModelError::MissingKey {
                kind: "assembly",
                key: key.to_string(),
            })
    }

    /// Orders assemblies by the value of one of their tags.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingKey`] and leaves the order unchanged if any
    /// assembly lacks the tag.
    pub fn sort_by_tag(&mut self, tag: &str) -> Result<(), ModelError> {
        if let Some(missing) = self.assemblies.iter().find(|a| !a.tags.contains_key(tag)) {
            return Err(ModelError::MissingKey {
                kind: "tag",
                key: format!("{} (assembly {})", tag, missing.id),
            });
        }
        self.assemblies
            .sort_by(|a, b| a.tags[tag].sort_cmp(&b.tags[tag]));
        Ok(())
    }

    pub fn get_atoms(&self, ligands: bool, inc_alt_states: bool) -> impl Iterator<Item = &Atom> + '_ {
        self.assemblies
            .iter()
            .flat_map(move |a| a.get_atoms(ligands, inc_alt_states))
    }

    pub fn rotate(&mut self, rotation: &Rotation3<f64>, pivot: Option<&Point3<f64>>) {
        for assembly in &mut self.assemblies {
            assembly.rotate(rotation, pivot);
        }
    }

    pub fn translate(&mut self, vector: &Vector3<f64>) {
        for assembly in &mut self.assemblies {
            assembly.translate(vector);
        }
    }
}

impl IntoIterator for Container {
    type Item = Assembly;
    type IntoIter = std::vec::IntoIter<Assembly>;

    fn into_iter(self) -> Self::IntoIter {
        self.assemblies.into_iter()
    }
}

/// Appends assemblies in order; extending with another `Container` merges its models.
impl Extend<Assembly> for Container {
    fn extend<I: IntoIterator<Item = Assembly>>(&mut self, iter: I) {
        self.assemblies.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = &'a Assembly;
    type IntoIter = std::slice::Iter<'a, Assembly>;

    fn into_iter(self) -> Self::IntoIter {
        self.assemblies.iter()
    }
}

/// The result of lowering a PDB file: a bare assembly for single-model input,
/// a container when the file delimits models.
#[derive(Debug, Clone)]
pub enum Structure {
    Assembly(Assembly),
    Container(Container),
}

impl Structure {
    pub fn id(&self) -> &str {
        match self {
            Structure::Assembly(a) => &a.id,
            Structure::Container(c) => &c.id,
        }
    }

    /// Every assembly, in model order.
    pub fn assemblies(&self) -> Vec<&Assembly> {
        match self {
            Structure::Assembly(a) => vec![a],
            Structure::Container(c) => c.iter().collect(),
        }
    }

    pub fn assemblies_mut(&mut self) -> Vec<&mut Assembly> {
        match self {
            Structure::Assembly(a) => vec![a],
            Structure::Container(c) => c.iter_mut().collect(),
        }
    }

    pub fn model_count(&self) -> usize {
        match self {
            Structure::Assembly(_) => 1,
            Structure::Container(c) => c.len(),
        }
    }

    pub fn as_assembly(&self) -> Option<&Assembly> {
        match self {
            Structure::Assembly(a) => Some(a),
            Structure::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Structure::Container(c) => Some(c),
            Structure::Assembly(_) => None,
        }
    }

    /// Takes one model out of the structure by position.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] if `index` is past the last model.
    pub fn into_model(self, index: usize) -> Result<Assembly, ModelError> {
        let len = self.model_count();
        let out_of_range = ModelError::IndexOutOfRange {
            kind: "assembly",
            index,
            len,
        };
        match self {
            Structure::Assembly(a) if index == 0 => Ok(a),
            Structure::Assembly(_) => Err(out_of_range),
            Structure::Container(c) => c.into_assemblies().into_iter().nth(index).ok_or(out_of_range),
        }
    }
}

impl From<Assembly> for Structure {
    fn from(assembly: Assembly) -> Self {
        Structure::Assembly(assembly)
    }
}

impl From<Container> for Structure {
    fn from(container: Container) -> Self {
        Structure::Container(container)
    }
}
