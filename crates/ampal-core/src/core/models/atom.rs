use super::error::ModelError;
use super::ids::MonomerId;
use super::tags::Tags;
use crate::core::utils::geometry;
use nalgebra::{Point3, Rotation3, Vector3};

/// The state label given to atoms recorded without an alternate location.
pub const DEFAULT_STATE: char = 'A';

/// A labelled point in space with the metadata carried by a PDB coordinate record.
///
/// Atoms are owned by the conformational state of a [`Monomer`](super::monomer::Monomer)
/// that holds them. The `monomer` handle points back at that owner inside an
/// [`Assembly`](super::assembly::Assembly) and is only used for navigation; it is
/// `None` until the owning monomer has been inserted into an assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Cartesian coordinates in Angstroms. Always finite.
    pub position: Point3<f64>,
    /// Element symbol as written in columns 77-78 (e.g. "C", "FE").
    pub element: String,
    /// Atom serial number.
    pub serial: i64,
    pub occupancy: f64,
    pub temp_factor: f64,
    /// Point charge as written in columns 79-80 (e.g. "2+"), at most two characters.
    pub charge: String,
    /// Free-form annotations.
    pub tags: Tags,
    label: String,
    state: char,
    pub(crate) monomer: Option<MonomerId>,
    pub(crate) backfilled: bool,
}

impl Atom {
    /// Creates a new `Atom` in the default state.
    ///
    /// Occupancy and temperature factor default to `1.0`, the serial number to `0`
    /// and the charge to an empty string.
    ///
    /// # Arguments
    ///
    /// * `label` - The residue-local label of the atom.
    /// * `element` - The element symbol.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(label: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            position,
            element: element.to_string(),
            serial: 0,
            label: label.to_string(),
            occupancy: 1.0,
            temp_factor: 1.0,
            charge: String::new(),
            tags: Tags::new(),
            state: DEFAULT_STATE,
            monomer: None,
            backfilled: false,
        }
    }

    pub fn with_serial(mut self, serial: i64) -> Self {
        self.serial = serial;
        self
    }

    /// Assigns the conformational state label.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidStateLabel`] for whitespace or control characters.
    pub fn with_state(mut self, state: char) -> Result<Self, ModelError> {
        validate_state_label(state)?;
        self.state = state;
        Ok(self)
    }

    /// Residue-local label (e.g. "CA", "OD1"). Fixed at construction because the
    /// owning state indexes atoms by it.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> char {
        self.state
    }

    /// The handle of the monomer owning this atom, once it belongs to an assembly.
    pub fn monomer(&self) -> Option<MonomerId> {
        self.monomer
    }

    /// `true` when this atom was copied from another state during alternate-state
    /// reconciliation rather than read from its own coordinate record.
    pub fn is_backfilled(&self) -> bool {
        self.backfilled
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }

    pub fn translate(&mut self, vector: &Vector3<f64>) {
        self.position += vector;
    }

    /// Applies `rotation` about `pivot`, or about the origin when no pivot is given.
    pub fn rotate(&mut self, rotation: &Rotation3<f64>, pivot: Option<&Point3<f64>>) {
        self.position = geometry::rotate_about(&self.position, rotation, pivot);
    }

    /// Copies this atom into another state, marking the copy as backfilled.
    pub(crate) fn backfilled_copy(&self, state: char) -> Self {
        let mut copy = self.clone();
        copy.state = state;
        copy.backfilled = true;
        copy
    }
}

pub(crate) fn validate_state_label(state: char) -> Result<(), ModelError> {
    if state.is_whitespace() || state.is_control() {
        Err(ModelError::InvalidStateLabel(state))
    } else {
        Ok(())
    }
}
