use serde::{Deserialize, Serialize};

/// Material occupying a voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Void / atmosphere.
    #[default]
    Air,
    Water,
    /// Continental crust.
    Granite,
    /// Oceanic crust.
    Basalt,
    /// Mantle rock.
    Peridotite,
    /// Melt.
    Magma,
    Sediment,
    Ice,
}

/// Constant physical properties of a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProps {
    /// kg/m³
    pub density: f64,
    /// J/(kg·K)
    pub specific_heat: f64,
    /// W/(m·K)
    pub conductivity: f64,
    /// Melting point at zero pressure (K); `None` for materials that do not melt.
    pub melting_point: Option<f64>,
    /// Silica fraction carried into melt.
    pub silica: f64,
}

impl MaterialProps {
    /// Thermal diffusivity k/(ρ·c) in m²/s.
    pub fn diffusivity(&self) -> f64 {
        self.conductivity / (self.density * self.specific_heat)
    }
}

const AIR: MaterialProps = MaterialProps {
    density: 1.2,
    specific_heat: 1005.0,
    conductivity: 0.025,
    melting_point: None,
    silica: 0.0,
};
const WATER: MaterialProps = MaterialProps {
    density: 1000.0,
    specific_heat: 4186.0,
    conductivity: 0.6,
    melting_point: None,
    silica: 0.0,
};
const GRANITE: MaterialProps = MaterialProps {
    density: 2700.0,
    specific_heat: 790.0,
    conductivity: 2.9,
    melting_point: Some(1500.0),
    silica: 0.72,
};
const BASALT: MaterialProps = MaterialProps {
    density: 3000.0,
    specific_heat: 840.0,
    conductivity: 1.7,
    melting_point: Some(1400.0),
    silica: 0.49,
};
const PERIDOTITE: MaterialProps = MaterialProps {
    density: 3300.0,
    specific_heat: 1000.0,
    conductivity: 3.0,
    melting_point: Some(1600.0),
    silica: 0.42,
};
const MAGMA: MaterialProps = MaterialProps {
    density: 2800.0,
    specific_heat: 1200.0,
    conductivity: 1.5,
    melting_point: None,
    silica: 0.5,
};
const SEDIMENT: MaterialProps = MaterialProps {
    density: 2200.0,
    specific_heat: 800.0,
    conductivity: 1.5,
    melting_point: Some(1350.0),
    silica: 0.65,
};
const ICE: MaterialProps = MaterialProps {
    density: 917.0,
    specific_heat: 2100.0,
    conductivity: 2.2,
    melting_point: None,
    silica: 0.0,
};

impl MaterialKind {
    pub const ALL: [MaterialKind; 8] = [
        MaterialKind::Air,
        MaterialKind::Water,
        MaterialKind::Granite,
        MaterialKind::Basalt,
        MaterialKind::Peridotite,
        MaterialKind::Magma,
        MaterialKind::Sediment,
        MaterialKind::Ice,
    ];

    pub fn props(self) -> &'static MaterialProps {
        match self {
            MaterialKind::Air => &AIR,
            MaterialKind::Water => &WATER,
            MaterialKind::Granite => &GRANITE,
            MaterialKind::Basalt => &BASALT,
            MaterialKind::Peridotite => &PERIDOTITE,
            MaterialKind::Magma => &MAGMA,
            MaterialKind::Sediment => &SEDIMENT,
            MaterialKind::Ice => &ICE,
        }
    }

    pub fn is_air(self) -> bool {
        self == MaterialKind::Air
    }

    /// Solid phases: rocks, sediment and ice.
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            MaterialKind::Granite
                | MaterialKind::Basalt
                | MaterialKind::Peridotite
                | MaterialKind::Sediment
                | MaterialKind::Ice
        )
    }

    /// Materials that melt into magma.
    pub fn is_rock(self) -> bool {
        self.props().melting_point.is_some()
    }

    /// Materials that can belong to a tectonic plate.
    pub fn is_crustal(self) -> bool {
        matches!(
            self,
            MaterialKind::Granite | MaterialKind::Basalt | MaterialKind::Sediment
        )
    }

    /// Pressure-adjusted melting point (K). `clapeyron` is in K/Pa.
    pub fn melting_point(self, pressure_pa: f64, clapeyron: f64) -> Option<f64> {
        self.props()
            .melting_point
            .map(|base| base + clapeyron * pressure_pa.max(0.0))
    }

    /// Rock kind that crystallizes from a melt of the given silica fraction.
    pub fn rock_from_silica(silica: f64) -> MaterialKind {
        if silica >= 0.6 {
            MaterialKind::Granite
        } else if silica >= 0.45 {
            MaterialKind::Basalt
        } else {
            MaterialKind::Peridotite
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MaterialKind::Air => "air",
            MaterialKind::Water => "water",
            MaterialKind::Granite => "granite",
            MaterialKind::Basalt => "basalt",
            MaterialKind::Peridotite => "peridotite",
            MaterialKind::Magma => "magma",
            MaterialKind::Sediment => "sediment",
            MaterialKind::Ice => "ice",
        }
    }
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rocks_have_melting_points() {
        for kind in MaterialKind::ALL {
            assert_eq!(kind.is_rock(), kind.melting_point(0.0, 0.0).is_some());
        }
        assert!(MaterialKind::Basalt.is_rock());
        assert!(!MaterialKind::Magma.is_rock());
        assert!(!MaterialKind::Ice.is_rock());
    }

    #[test]
    fn melting_point_rises_with_pressure() {
        let low = MaterialKind::Granite.melting_point(1e5, 1e-7).unwrap();
        let high = MaterialKind::Granite.melting_point(1e9, 1e-7).unwrap();
        assert!(high > low);
    }

    #[test]
    fn silica_selects_rock() {
        assert_eq!(MaterialKind::rock_from_silica(0.72), MaterialKind::Granite);
        assert_eq!(MaterialKind::rock_from_silica(0.49), MaterialKind::Basalt);
        assert_eq!(MaterialKind::rock_from_silica(0.3), MaterialKind::Peridotite);
    }

    #[test]
    fn diffusivity_positive() {
        for kind in MaterialKind::ALL {
            assert!(kind.props().diffusivity() > 0.0, "{kind}");
        }
    }
}
