/**
 * Actuator command vector
 *
 * Holds one target value per linear actuator of the platform and renders
 * it into the line protocol understood by the platform controller:
 * six ASCII integers separated by single spaces, terminated by '\n'.
 */

use std::fmt;
use thiserror::Error;

pub const NUM_ACTUATORS: usize = 6;
pub const MIN_ACTUATOR_VALUE: i32 = 0;
pub const MAX_ACTUATOR_VALUE: i32 = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuatorError{
    #[error("expected {expected} actuator values, got {actual}")]
    ArityMismatch{ expected: usize, actual: usize },
    #[error("actuator index {index} out of range (0..{len})")]
    IndexOutOfRange{ index: usize, len: usize },
}

pub fn clamp_value(value: i32) -> i32{
    value.clamp(MIN_ACTUATOR_VALUE, MAX_ACTUATOR_VALUE)
}

/// Fixed-size actuator targets; every element always lies within
/// `[MIN_ACTUATOR_VALUE, MAX_ACTUATOR_VALUE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorVector{
    values: [i32; NUM_ACTUATORS],
}

impl Default for ActuatorVector{
    fn default() -> Self{
        Self::new()
    }
}

impl ActuatorVector{
    pub fn new() -> Self{
        ActuatorVector{
            values: [clamp_value(0); NUM_ACTUATORS],
        }
    }

    fn check_index(index: usize) -> Result<(), ActuatorError>{
        if index >= NUM_ACTUATORS{
            return Err(ActuatorError::IndexOutOfRange{ index, len: NUM_ACTUATORS });
        }
        Ok(())
    }

    /// Store `value` at `index`, clamped into range.
    pub fn set(&mut self, index: usize, value: i32) -> Result<(), ActuatorError>{
        Self::check_index(index)?;
        self.values[index] = clamp_value(value);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<i32, ActuatorError>{
        Self::check_index(index)?;
        Ok(self.values[index])
    }

    /// Replace every value at once. Input must have exactly
    /// `NUM_ACTUATORS` entries; on mismatch nothing is modified.
    pub fn replace(&mut self, values: &[i32]) -> Result<(), ActuatorError>{
        if values.len() != NUM_ACTUATORS{
            return Err(ActuatorError::ArityMismatch{
                expected: NUM_ACTUATORS,
                actual: values.len(),
            });
        }
        for (slot, &v) in self.values.iter_mut().zip(values){
            *slot = clamp_value(v);
        }
        Ok(())
    }

    pub fn values(&self) -> [i32; NUM_ACTUATORS]{
        self.values
    }

    pub fn as_slice(&self) -> &[i32]{
        &self.values
    }

    /// Wire line for the platform controller, e.g. `"10 0 0 255 0 0\n"`.
    pub fn serialize(&self) -> String{
        self.to_string()
    }
}

impl fmt::Display for ActuatorVector{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result{
        for (i, v) in self.values.iter().enumerate(){
            let sep = if i < NUM_ACTUATORS - 1 { " " } else { "\n" };
            write!(f, "{}{}", v, sep)?;
        }
        Ok(())
    }
}
