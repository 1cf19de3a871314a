use super::*;

/// Transverse electric field between the plates, bound to a field scale and plate gap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldModel {
    pub shape: FieldShape,
    pub orientation: FieldOrientation,
    pub field_scale: f64,
    pub gap: f64,
}

impl FieldModel {
    pub fn new(shape: FieldShape, orientation: FieldOrientation, field_scale: f64, gap: f64) -> FieldModel {
        FieldModel {
            shape,
            orientation,
            field_scale,
            gap
        }
    }

    /// Same shape and orientation at a different field scale.
    pub fn with_field_scale(&self, field_scale: f64) -> FieldModel {
        FieldModel {
            field_scale,
            ..*self
        }
    }

    /// Electric field in V/m at transverse displacement `y`. Not restricted to |y| <= gap.
    #[inline]
    pub fn electric_field(&self, y: f64) -> f64 {
        electric_field(y, self.field_scale, self.gap, self.shape, self.orientation)
    }

    /// Transverse acceleration q*E(y)/m.
    #[inline]
    pub fn acceleration(&self, y: f64, particle: &ParticleConstants) -> f64 {
        particle.charge_to_mass()*self.electric_field(y)
    }
}

impl fmt::Display for FieldModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} with E_scale = {} V/m across a {} m gap", self.shape, self.orientation, self.field_scale, self.gap)
    }
}

/// E(y) = s*E_scale for UNIFORM and E(y) = s*E_scale - |E_scale|*y/g for LINEAR, where s is the orientation sign.
/// Negating either E_scale or the orientation mirrors the field about the axis.
#[inline]
pub fn electric_field(y: f64, field_scale: f64, gap: f64, shape: FieldShape, orientation: FieldOrientation) -> f64 {
    let s = orientation.sign();
    match shape {
        FieldShape::UNIFORM => s*field_scale,
        FieldShape::LINEAR => s*field_scale - field_scale.abs()*y/gap,
    }
}
