//! Point-symmetry groups of the simulation cell.
//!
//! A [`SymmetryGroup`] is a finite set of [`SymmetryElement`]s, element 0
//! always being the identity. Each element is an affine signed-permutation
//! of the axes about a fixed point, plus a complex phase supplied when the
//! symmetry was declared (even/odd mirrors, Bloch-like rotation phases).
//!
//! During output the group is used three ways per element: chunk bounding
//! regions are pushed forward into their symmetric images, a requested
//! component is pulled back to the component actually stored in memory, and
//! sample points inside an image are pulled back into the chunk's own frame.
//! Electric components transform as vectors, magnetic components as
//! pseudovectors (an extra determinant sign), material quantities are
//! invariant.

use num_complex::Complex64;
use num_traits::One;

use crate::field::{Component, ComponentKind};
use crate::geometry::{Direction, Region, Vector};

/// Even or odd character of a declared symmetry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    /// The phase a field of this parity picks up under the operation.
    #[inline]
    pub fn phase(self) -> Complex64 {
        match self {
            Parity::Even => Complex64::one(),
            Parity::Odd => -Complex64::one(),
        }
    }
}

/// A signed permutation of the axes: `e_d -> sign[d] * e_{perm[d]}`.
#[derive(Copy, Clone, Debug, PartialEq)]
struct AxisMap {
    perm: [Direction; 3],
    sign: [f64; 3],
}

impl AxisMap {
    const IDENTITY: AxisMap = AxisMap {
        perm: Direction::ALL,
        sign: [1.0; 3],
    };

    /// `self . other` (apply `other` first).
    fn compose(&self, other: &AxisMap) -> AxisMap {
        let mut perm = Direction::ALL;
        let mut sign = [1.0; 3];
        for d in Direction::ALL {
            let i = d.index();
            let mid = other.perm[i].index();
            perm[i] = self.perm[mid];
            sign[i] = other.sign[i] * self.sign[mid];
        }
        AxisMap { perm, sign }
    }

    fn inverse(&self) -> AxisMap {
        let mut perm = Direction::ALL;
        let mut sign = [1.0; 3];
        for d in Direction::ALL {
            let i = d.index();
            let j = self.perm[i].index();
            perm[j] = d;
            sign[j] = self.sign[i];
        }
        AxisMap { perm, sign }
    }

    /// Determinant: permutation parity times the product of signs.
    fn det(&self) -> f64 {
        let p = [
            self.perm[0].index(),
            self.perm[1].index(),
            self.perm[2].index(),
        ];
        let mut det = self.sign[0] * self.sign[1] * self.sign[2];
        for i in 0..3 {
            for j in (i + 1)..3 {
                if p[i] > p[j] {
                    det = -det;
                }
            }
        }
        det
    }

    /// Affine action about `center`: `p -> A(p - center) + center`.
    fn apply(&self, p: Vector, center: Vector) -> Vector {
        let mut out = Vector::zero();
        for d in Direction::ALL {
            let target = self.perm[d.index()];
            out[target] = self.sign[d.index()] * (p[d] - center[d]) + center[target];
        }
        out
    }
}

/// One operation of a symmetry group.
///
/// Stores the forward axis map, its cached inverse, the fixed point the map
/// pivots about, and the declared phase. Equality is exact (the maps are
/// built from the same constructors on every process).
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetryElement {
    map: AxisMap,
    inv: AxisMap,
    center: Vector,
    phase: Complex64,
}

impl SymmetryElement {
    fn new(map: AxisMap, center: Vector, phase: Complex64) -> Self {
        let inv = map.inverse();
        SymmetryElement {
            map,
            inv,
            center,
            phase,
        }
    }

    /// The identity operation.
    pub fn identity(center: Vector) -> Self {
        Self::new(AxisMap::IDENTITY, center, Complex64::one())
    }

    /// `self . other` (apply `other` first). Phases multiply.
    ///
    /// # Panics
    ///
    /// Panics if the two elements pivot about different fixed points; a
    /// composite of such maps is no longer expressible in this form.
    pub fn compose(&self, other: &SymmetryElement) -> SymmetryElement {
        assert!(
            self.center == other.center,
            "composed symmetry elements must share a fixed point"
        );
        Self::new(
            self.map.compose(&other.map),
            self.center,
            self.phase * other.phase,
        )
    }

    /// Forward map of a point into the element's image.
    pub fn transform_point(&self, p: Vector) -> Vector {
        self.map.apply(p, self.center)
    }

    /// Pulls an image point back into the source frame.
    pub fn untransform_point(&self, p: Vector) -> Vector {
        self.inv.apply(p, self.center)
    }

    /// Forward map of a closed region (corners mapped, bounds renormalized).
    pub fn transform_region(&self, r: &Region) -> Region {
        let a = self.transform_point(r.min());
        let b = self.transform_point(r.max());
        let mut min = Vector::zero();
        let mut max = Vector::zero();
        for d in Direction::ALL {
            min[d] = a[d].min(b[d]);
            max[d] = a[d].max(b[d]);
        }
        Region::new(min, max)
    }

    /// Which stored component a request for `c` resolves to under this
    /// element. Material components are invariant.
    pub fn source_component(&self, c: Component) -> Component {
        let Some(axis) = c.direction() else { return c };
        let source_axis = self.inv.perm[axis.index()];
        match c.kind() {
            ComponentKind::Electric => Component::electric(source_axis),
            ComponentKind::Magnetic => Component::magnetic(source_axis),
            ComponentKind::Material => c,
        }
    }

    /// Phase factor applied to a sample of the stored component `source`
    /// when it is transported into this element's image.
    ///
    /// Vectors pick up the sign of their axis under the map, pseudovectors
    /// an additional determinant sign, and both are scaled by the declared
    /// phase. Material components always return one.
    pub fn phase_shift(&self, source: Component) -> Complex64 {
        let Some(axis) = source.direction() else {
            return Complex64::one();
        };
        let mut geometric = self.map.sign[axis.index()];
        if source.kind() == ComponentKind::Magnetic {
            geometric *= self.map.det();
        }
        self.phase * geometric
    }
}

/// A finite group of symmetry elements; element 0 is the identity.
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetryGroup {
    elements: Vec<SymmetryElement>,
}

impl SymmetryGroup {
    /// The group containing only the identity.
    pub fn trivial() -> Self {
        SymmetryGroup {
            elements: vec![SymmetryElement::identity(Vector::zero())],
        }
    }

    /// Mirror symmetry through the plane normal to `axis` at `center`.
    ///
    /// ```
    /// use field_gather::geometry::{Direction, Vector};
    /// use field_gather::symmetry::{Parity, SymmetryGroup};
    ///
    /// let s = SymmetryGroup::mirror(Direction::X, Vector::new(1.0, 0.0, 0.0), Parity::Even);
    /// assert_eq!(s.multiplicity(), 2);
    /// let p = s.element(1).transform_point(Vector::new(0.25, 2.0, 0.0));
    /// assert_eq!(p, Vector::new(1.75, 2.0, 0.0));
    /// ```
    pub fn mirror(axis: Direction, center: Vector, parity: Parity) -> Self {
        let mut map = AxisMap::IDENTITY;
        map.sign[axis.index()] = -1.0;
        SymmetryGroup {
            elements: vec![
                SymmetryElement::identity(center),
                SymmetryElement::new(map, center, parity.phase()),
            ],
        }
    }

    /// Twofold rotation about `axis` at `center`.
    pub fn rotate2(axis: Direction, center: Vector, parity: Parity) -> Self {
        let (u, v) = axis.others();
        let mut map = AxisMap::IDENTITY;
        map.sign[u.index()] = -1.0;
        map.sign[v.index()] = -1.0;
        SymmetryGroup {
            elements: vec![
                SymmetryElement::identity(center),
                SymmetryElement::new(map, center, parity.phase()),
            ],
        }
    }

    /// Fourfold rotation about `axis` at `center`; `quarter_phase` is the
    /// phase of one quarter turn and must be a fourth root of unity.
    pub fn rotate4(axis: Direction, center: Vector, quarter_phase: Complex64) -> Self {
        assert!(
            (quarter_phase.powi(4) - Complex64::one()).norm() < 1e-9,
            "fourfold rotation phase must satisfy phase^4 == 1, got {quarter_phase}"
        );
        let (u, v) = axis.others();
        let mut map = AxisMap::IDENTITY;
        map.perm[u.index()] = v;
        map.perm[v.index()] = u;
        map.sign[v.index()] = -1.0;
        let r = SymmetryElement::new(map, center, quarter_phase);
        let r2 = r.compose(&r);
        let r3 = r2.compose(&r);
        SymmetryGroup {
            elements: vec![SymmetryElement::identity(center), r, r2, r3],
        }
    }

    /// Direct product of two groups sharing a fixed point.
    ///
    /// The factors should have only the identity in common; no deduplication
    /// is attempted.
    pub fn product(&self, other: &SymmetryGroup) -> SymmetryGroup {
        let mut elements = Vec::with_capacity(self.elements.len() * other.elements.len());
        for a in &self.elements {
            for b in &other.elements {
                elements.push(a.compose(b));
            }
        }
        SymmetryGroup { elements }
    }

    /// Number of elements in the group.
    #[inline]
    pub fn multiplicity(&self) -> usize {
        self.elements.len()
    }

    /// All elements; index 0 is the identity.
    #[inline]
    pub fn elements(&self) -> &[SymmetryElement] {
        &self.elements
    }

    /// The `sn`-th element.
    #[inline]
    pub fn element(&self, sn: usize) -> &SymmetryElement {
        &self.elements[sn]
    }
}
