use pyo3::prelude::*;
use pyo3::exceptions::{PyIndexError, PyValueError};

use crate::actuator::ActuatorError;
use crate::controller::Controller;
use crate::link::ConnectionConfig;

fn to_py_err(err: ActuatorError) -> PyErr{
    match err{
        ActuatorError::IndexOutOfRange{ .. } => PyIndexError::new_err(err.to_string()),
        ActuatorError::ArityMismatch{ .. } => PyValueError::new_err(err.to_string()),
    }
}

#[pyclass(name = "Controller")]
pub struct PyController{
    inner: Controller,
}

#[pymethods]
impl PyController{
    #[new]
    fn new() -> Self{
        PyController{ inner: Controller::with_serial() }
    }

    #[pyo3(signature = (port_name, baud_rate = 9600))]
    fn connect(&mut self, port_name: &str, baud_rate: u32) -> bool{
        self.inner.apply_config(&ConnectionConfig::new(port_name, baud_rate))
    }

    fn disconnect(&mut self){
        self.inner.disconnect();
    }

    fn is_open(&self) -> bool{
        self.inner.is_connected()
    }

    fn set_axis(&mut self, index: usize, value: i32) -> PyResult<()>{
        self.inner.manual_source().update(index, value).map_err(to_py_err)
    }

    fn actuators(&self) -> Vec<i32>{
        self.inner.actuators().as_slice().to_vec()
    }

    fn send(&mut self) -> bool{
        let before = self.inner.status().lines_sent;
        self.inner.manual_source().request_send();
        self.inner.status().lines_sent > before
    }

    fn frame(&mut self, values: Vec<i32>) -> PyResult<()>{
        self.inner.motion_source().frame(&values).map_err(to_py_err)
    }

    fn set_motion_enabled(&mut self, enabled: bool){
        self.inner.set_motion_enabled(enabled);
    }

    fn set_motion_connected(&mut self, connected: bool){
        self.inner.motion_source().set_connected(connected);
    }

    fn poll(&mut self) -> usize{
        self.inner.on_readable()
    }

    fn log(&self) -> Vec<String>{
        self.inner.log().iter().map(|e| e.to_string()).collect()
    }

    fn status(&self) -> (String, String, bool, bool){
        let s = self.inner.status();
        (s.link.clone(), s.motion.clone(), s.send_enabled, s.motion_enabled)
    }
}

#[pymodule]
fn stewart_link(_py: Python, m: &PyModule) -> PyResult<()>{
    m.add_class::<PyController>()?;
    Ok(())
}
