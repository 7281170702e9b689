//! Built-in historical rotor set.

use crate::config::MachineConfig;
use crate::error::EnigmaError;

/// Naval four-rotor machine: rotors I-VIII, the thin BETA and GAMMA
/// rotors, and the thin B and C reflectors.
pub const HISTORICAL_CONFIG: &str = "\
A-Z
5 3
I MQ (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
II ME (FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)
III MV (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)
IV MJ (AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)
V MZ (AVOLDRWFIUQ)(BZKSMNHYC) (EGTJPX)
VI MZM (AJQDVLEOZWIYTS) (CGMNHFUX) (BPRK)
VII MZM (ANOUPFRIMBZTLWKSVEGCJYDHXQ)
VIII MZM (AFLSETWUNDHOZVICQ) (BKJ) (GXY) (MPR)
BETA N (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
GAMMA N (AFNIRLBSQWVXGUZDKMTPCOYJHE)
B R (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP)
     (RX) (SZ) (TV)
C R (AR) (BD) (CO) (EJ) (FN) (GT) (HK) (IV) (LM) (PW)
     (QZ) (SX) (UY)
";

/// Name accepted in place of a configuration path for the built-in set.
pub const HISTORICAL: &str = "historical";

pub fn historical_config() -> Result<MachineConfig, EnigmaError> {
    MachineConfig::parse(HISTORICAL_CONFIG)
}
