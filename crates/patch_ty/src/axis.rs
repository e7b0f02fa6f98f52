use std::fmt;

use derive_more::Debug;
use smol_str::SmolStr;

/// An opaque identifier for an unresolved type variable.
///
/// Block definitions use human-chosen names (`"p"`, `"elem"`); the solver
/// mints instance-scoped names so two instances of the same block type never
/// share a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[debug("VarId({_0:?})")]
pub struct VarId(pub SmolStr);

impl VarId {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        VarId(name.into())
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}", self.0)
    }
}

impl From<&str> for VarId {
    fn from(value: &str) -> Self {
        VarId(value.into())
    }
}

/// Variable-or-value: the shape of every polymorphic type component.
///
/// An `Axis` starts life as `Var` when a block declares a polymorphic port
/// and is replaced (never mutated) with `Inst` once resolution pins it down.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Axis<T> {
    #[debug("{_0:?}")]
    Var(VarId),
    #[debug("{_0:?}")]
    Inst(T),
}

impl<T> Axis<T> {
    pub fn var(name: impl Into<SmolStr>) -> Self {
        Axis::Var(VarId::new(name))
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Axis::Var(_))
    }

    pub fn as_inst(&self) -> Option<&T> {
        match self {
            Axis::Var(_) => None,
            Axis::Inst(v) => Some(v),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Axis<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Var(v) => write!(f, "{v}"),
            Axis::Inst(v) => write!(f, "{v}"),
        }
    }
}

/// Two instantiated axis values disagreed. Values are carried pre-rendered;
/// conflicts exist to be reported, not recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisConflict {
    pub left: String,
    pub right: String,
}

impl fmt::Display for AxisConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` vs `{}`", self.left, self.right)
    }
}

/// Unify two axis values.
///
/// var+var keeps the left variable (true variable identity is tracked by the
/// solver's union-find, not here); var+inst resolves to the instance; two
/// equal instances pass through; two unequal instances are a hard error —
/// mismatches surface, they are never averaged or coerced.
pub fn unify_axis<T>(a: &Axis<T>, b: &Axis<T>) -> Result<Axis<T>, AxisConflict>
where
    T: Clone + PartialEq + fmt::Display,
{
    match (a, b) {
        (Axis::Var(_), Axis::Var(_)) => Ok(a.clone()),
        (Axis::Var(_), Axis::Inst(v)) | (Axis::Inst(v), Axis::Var(_)) => Ok(Axis::Inst(v.clone())),
        (Axis::Inst(x), Axis::Inst(y)) => {
            if x == y {
                Ok(a.clone())
            } else {
                Err(AxisConflict {
                    left: x.to_string(),
                    right: y.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_var_keeps_left() {
        let a: Axis<u32> = Axis::var("a");
        let b: Axis<u32> = Axis::var("b");
        assert_eq!(unify_axis(&a, &b), Ok(a));
    }

    #[test]
    fn var_inst_resolves() {
        let a: Axis<u32> = Axis::var("a");
        assert_eq!(unify_axis(&a, &Axis::Inst(3)), Ok(Axis::Inst(3)));
        assert_eq!(unify_axis(&Axis::Inst(3), &a), Ok(Axis::Inst(3)));
    }

    #[test]
    fn equal_insts_pass() {
        let a: Axis<u32> = Axis::Inst(7);
        assert_eq!(unify_axis(&a, &a), Ok(a));
    }

    #[test]
    fn unequal_insts_conflict() {
        let err = unify_axis(&Axis::Inst(1u32), &Axis::Inst(2u32)).unwrap_err();
        assert_eq!(err.left, "1");
        assert_eq!(err.right, "2");
    }
}
