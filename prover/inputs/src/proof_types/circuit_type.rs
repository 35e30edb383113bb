use std::{fmt, str::FromStr};

use crate::errors::ProverInputsError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircuitType {
    Append,
    Update,
    AddressAppend,
    Inclusion,
    NonInclusion,
}

impl fmt::Display for CircuitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CircuitType::Append => "append",
                CircuitType::Update => "update",
                CircuitType::AddressAppend => "address-append",
                CircuitType::Inclusion => "inclusion",
                CircuitType::NonInclusion => "non-inclusion",
            }
        )
    }
}

impl FromStr for CircuitType {
    type Err = ProverInputsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(CircuitType::Append),
            "update" => Ok(CircuitType::Update),
            "address-append" => Ok(CircuitType::AddressAppend),
            "inclusion" => Ok(CircuitType::Inclusion),
            "non-inclusion" => Ok(CircuitType::NonInclusion),
            _ => Err(ProverInputsError::InvalidCircuitType {
                expected: "one of append, update, address-append, inclusion, non-inclusion"
                    .to_string(),
                actual: s.to_string(),
            }),
        }
    }
}

impl CircuitType {
    /// Fails unless `circuit_type` names `self`.
    pub fn expect(&self, circuit_type: &str) -> Result<(), ProverInputsError> {
        if circuit_type.parse::<CircuitType>()? != *self {
            return Err(ProverInputsError::InvalidCircuitType {
                expected: self.to_string(),
                actual: circuit_type.to_string(),
            });
        }
        Ok(())
    }
}
