use crate::material::MaterialKind;

/// Velocity in the voxel's local frame (m/yr).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalVelocity {
    pub radial: f64,
    pub north: f64,
    pub east: f64,
}

impl LocalVelocity {
    pub fn horizontal_speed(&self) -> f64 {
        (self.north * self.north + self.east * self.east).sqrt()
    }
}

/// One material cell of the planet grid.
///
/// Material kind and density are private so they can only change together
/// through [`Voxel::set_material`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voxel {
    material: MaterialKind,
    density: f64,
    /// K
    pub temperature: f64,
    /// Pa
    pub pressure: f64,
    pub velocity: LocalVelocity,
    /// Years since formation.
    pub age: f64,
    /// Accumulated stress (Pa).
    pub stress: f64,
    pub brittle: bool,
    pub fractured: bool,
    /// Owning plate, 0 when unassigned.
    pub plate_id: u16,
    /// Sub-cell position (radial, north, east), each in `[-0.5, 0.5)`.
    pub offset: [f32; 3],
    /// Meters relative to sea level.
    pub elevation: f64,
    /// Degree of partial melting in `[0, 1]`.
    pub melt_fraction: f64,
    /// Silica fraction, preserved through melting.
    pub silica: f64,
}

impl Default for Voxel {
    fn default() -> Self {
        Self::new(MaterialKind::Air)
    }
}

impl Voxel {
    pub fn new(material: MaterialKind) -> Self {
        let props = material.props();
        Self {
            material,
            density: props.density,
            temperature: 0.0,
            pressure: 0.0,
            velocity: LocalVelocity::default(),
            age: 0.0,
            stress: 0.0,
            brittle: false,
            fractured: false,
            plate_id: 0,
            offset: [0.0; 3],
            elevation: 0.0,
            melt_fraction: 0.0,
            silica: props.silica,
        }
    }

    pub fn material(&self) -> MaterialKind {
        self.material
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Change material, updating density in the same step.
    ///
    /// Silica is kept when a rock melts or a melt solidifies so composition
    /// survives the round trip; any other change resets it to the material default.
    pub fn set_material(&mut self, material: MaterialKind) {
        let props = material.props();
        let keeps_composition = (self.material.is_rock() && material == MaterialKind::Magma)
            || (self.material == MaterialKind::Magma && material.is_rock());
        if !keeps_composition {
            self.silica = props.silica;
        }
        self.material = material;
        self.density = props.density;
    }

    pub fn is_air(&self) -> bool {
        self.material.is_air()
    }

    /// True when every continuous field is finite.
    pub fn is_finite(&self) -> bool {
        self.temperature.is_finite()
            && self.pressure.is_finite()
            && self.velocity.radial.is_finite()
            && self.velocity.north.is_finite()
            && self.velocity.east.is_finite()
            && self.age.is_finite()
            && self.stress.is_finite()
            && self.elevation.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_voxel_density_matches_material() {
        for kind in MaterialKind::ALL {
            let v = Voxel::new(kind);
            assert_eq!(v.density(), kind.props().density);
        }
    }

    #[test]
    fn set_material_updates_density() {
        let mut v = Voxel::new(MaterialKind::Water);
        v.set_material(MaterialKind::Ice);
        assert_eq!(v.material(), MaterialKind::Ice);
        assert_eq!(v.density(), MaterialKind::Ice.props().density);
    }

    #[test]
    fn melting_keeps_silica() {
        let mut v = Voxel::new(MaterialKind::Granite);
        v.set_material(MaterialKind::Magma);
        assert_eq!(v.silica, MaterialKind::Granite.props().silica);
        v.set_material(MaterialKind::Granite);
        assert_eq!(v.silica, MaterialKind::Granite.props().silica);

        let mut w = Voxel::new(MaterialKind::Water);
        w.silica = 0.9;
        w.set_material(MaterialKind::Ice);
        assert_eq!(w.silica, 0.0);
    }

    #[test]
    fn default_is_air() {
        assert!(Voxel::default().is_air());
    }
}
