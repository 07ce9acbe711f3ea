//! Boundary conditions imposed at the ends of the curve.
//!
//! Conditions are honoured in strict derivative order: a velocity condition at
//! an endpoint only makes sense on top of the position condition there, an
//! acceleration condition on top of velocity, and jerk on top of acceleration.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::error::{OptError, Result};

/// One boundary condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryCondition {
    InitPos,
    InitVel,
    InitAcc,
    InitJerk,
    EndPos,
    EndVel,
    EndAcc,
    EndJerk,
}

impl BoundaryCondition {
    /// All conditions, start side first, each side in derivative order.
    pub const ALL: [BoundaryCondition; 8] = [
        BoundaryCondition::InitPos,
        BoundaryCondition::InitVel,
        BoundaryCondition::InitAcc,
        BoundaryCondition::InitJerk,
        BoundaryCondition::EndPos,
        BoundaryCondition::EndVel,
        BoundaryCondition::EndAcc,
        BoundaryCondition::EndJerk,
    ];

    /// Bit used by the integer encoding of problem files.
    pub fn bit(self) -> u32 {
        match self {
            BoundaryCondition::InitPos => 0x01,
            BoundaryCondition::InitVel => 0x02,
            BoundaryCondition::InitAcc => 0x04,
            BoundaryCondition::InitJerk => 0x08,
            BoundaryCondition::EndPos => 0x10,
            BoundaryCondition::EndVel => 0x20,
            BoundaryCondition::EndAcc => 0x40,
            BoundaryCondition::EndJerk => 0x80,
        }
    }

    /// Derivative order constrained by this condition (0 = position).
    pub fn order(self) -> usize {
        match self {
            BoundaryCondition::InitPos | BoundaryCondition::EndPos => 0,
            BoundaryCondition::InitVel | BoundaryCondition::EndVel => 1,
            BoundaryCondition::InitAcc | BoundaryCondition::EndAcc => 2,
            BoundaryCondition::InitJerk | BoundaryCondition::EndJerk => 3,
        }
    }

    pub fn is_start(self) -> bool {
        self.bit() < BoundaryCondition::EndPos.bit()
    }
}

/// A set of boundary conditions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoundaryFlags(u32);

impl BoundaryFlags {
    pub const INIT_POS: BoundaryFlags = BoundaryFlags(0x01);
    pub const INIT_VEL: BoundaryFlags = BoundaryFlags(0x02);
    pub const INIT_ACC: BoundaryFlags = BoundaryFlags(0x04);
    pub const INIT_JERK: BoundaryFlags = BoundaryFlags(0x08);
    pub const END_POS: BoundaryFlags = BoundaryFlags(0x10);
    pub const END_VEL: BoundaryFlags = BoundaryFlags(0x20);
    pub const END_ACC: BoundaryFlags = BoundaryFlags(0x40);
    pub const END_JERK: BoundaryFlags = BoundaryFlags(0x80);
    pub const ALL: BoundaryFlags = BoundaryFlags(0xff);
    pub const NONE: BoundaryFlags = BoundaryFlags(0);

    /// Bit marking "no constraint" in the integer encoding. It carries no condition.
    pub const NONE_BIT: u32 = 0x100;

    /// Decode the integer encoding used by problem files.
    pub fn from_bits(bits: u32) -> Result<Self> {
        let unknown = bits & !(Self::ALL.0 | Self::NONE_BIT);
        if unknown != 0 {
            return Err(OptError::InvalidProblem(format!(
                "unknown boundary flag bits {:#x}",
                unknown
            )));
        }
        Ok(BoundaryFlags(bits & Self::ALL.0))
    }

    /// Integer encoding; the empty set is written as the "no constraint" bit.
    pub fn bits(self) -> u32 {
        if self.0 == 0 {
            Self::NONE_BIT
        } else {
            self.0
        }
    }

    pub fn contains(self, condition: BoundaryCondition) -> bool {
        self.0 & condition.bit() != 0
    }

    pub fn insert(&mut self, condition: BoundaryCondition) {
        self.0 |= condition.bit();
    }

    pub fn remove(&mut self, condition: BoundaryCondition) {
        self.0 &= !condition.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Conditions in the set, start side first.
    pub fn iter(self) -> impl Iterator<Item = BoundaryCondition> {
        BoundaryCondition::ALL
            .into_iter()
            .filter(move |c| self.contains(*c))
    }

    /// Number of conditions in the set.
    pub fn active_count(self) -> usize {
        self.iter().count()
    }

    /// Number of leading start conditions honoured (0 to 4).
    pub fn start_order(self) -> usize {
        Self::prefix_len(self, &BoundaryCondition::ALL[..4])
    }

    /// Number of leading end conditions honoured (0 to 4).
    pub fn end_order(self) -> usize {
        Self::prefix_len(self, &BoundaryCondition::ALL[4..])
    }

    fn prefix_len(self, side: &[BoundaryCondition]) -> usize {
        side.iter().take_while(|c| self.contains(**c)).count()
    }

    /// The honoured subset: each side truncated at its first missing order.
    pub fn effective(self) -> BoundaryFlags {
        let mut flags = BoundaryFlags::NONE;
        for c in &BoundaryCondition::ALL[..self.start_order()] {
            flags.insert(*c);
        }
        for c in &BoundaryCondition::ALL[4..4 + self.end_order()] {
            flags.insert(*c);
        }
        flags
    }

    /// Check that every condition is backed by all lower-order ones on its side.
    pub fn validate(self) -> Result<()> {
        let ignored: Vec<_> = self.iter().filter(|c| !self.effective().contains(*c)).collect();
        if ignored.is_empty() {
            Ok(())
        } else {
            Err(OptError::BoundaryOrder(format!(
                "{:?} set without all lower-order conditions on the same side",
                ignored
            )))
        }
    }
}

impl BitOr for BoundaryFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        BoundaryFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for BoundaryFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for BoundaryFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        BoundaryFlags(self.0 & rhs.0)
    }
}

impl From<BoundaryCondition> for BoundaryFlags {
    fn from(condition: BoundaryCondition) -> Self {
        BoundaryFlags(condition.bit())
    }
}

impl FromIterator<BoundaryCondition> for BoundaryFlags {
    fn from_iter<I: IntoIterator<Item = BoundaryCondition>>(iter: I) -> Self {
        let mut flags = BoundaryFlags::NONE;
        for c in iter {
            flags.insert(c);
        }
        flags
    }
}

impl fmt::Debug for BoundaryFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
