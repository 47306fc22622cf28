use elegan_core::config::SimConfig;
use elegan_core::env::ElegansEnv;
use elegan_core::field::Observation;
use elegan_core::world::{Directions, PerAgent, SimulationError};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyFloat, PyList};

/// Minimal PyO3 module exposing elegan-core to Python.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string(&SimConfig::default())
        .map_err(|e| PyValueError::new_err(format!("failed to serialize default config: {e}")))
}

#[pyfunction]
fn validate_config_json(config_json: &str) -> PyResult<bool> {
    parse_config(Some(config_json))
        .map(|_| true)
        .map_err(PyValueError::new_err)
}

/// Parse and validate a JSON config; `None` means the defaults.
fn parse_config(config_json: Option<&str>) -> Result<SimConfig, String> {
    let config: SimConfig = match config_json {
        Some(json) => serde_json::from_str(json).map_err(|e| format!("invalid config json: {e}"))?,
        None => SimConfig::default(),
    };
    config
        .validate()
        .map_err(|e| format!("invalid configuration: {e}"))?;
    Ok(config)
}

fn to_py_err(err: SimulationError) -> PyErr {
    match err {
        SimulationError::EpisodeNotStarted => PyRuntimeError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

/// A bare `[left, right]` list for one agent, a list of them otherwise.
fn observations_to_py<'py>(
    py: Python<'py>,
    observations: PerAgent<Observation>,
) -> PyResult<Bound<'py, PyAny>> {
    match observations {
        PerAgent::Single(obs) => Ok(PyList::new(py, obs)?.into_any()),
        PerAgent::Multi(all) => Ok(PyList::new(py, all.into_iter().map(|obs| obs.to_vec()))?.into_any()),
    }
}

fn rewards_to_py<'py>(py: Python<'py>, rewards: PerAgent<f32>) -> PyResult<Bound<'py, PyAny>> {
    match rewards {
        PerAgent::Single(reward) => Ok(PyFloat::new(py, f64::from(reward)).into_any()),
        PerAgent::Multi(all) => Ok(PyList::new(py, all)?.into_any()),
    }
}

/// Gym-style environment: `reset()`, `step(action)`, `render_frame()`, `seed(n)`.
#[pyclass(name = "CElegansEnv")]
struct PyElegansEnv {
    inner: ElegansEnv,
}

#[pymethods]
impl PyElegansEnv {
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = parse_config(config_json).map_err(PyValueError::new_err)?;
        let inner = ElegansEnv::new(config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    #[getter]
    fn n_elegans(&self) -> usize {
        self.inner.config().n_elegans
    }

    fn seed(&mut self, seed: u64) {
        self.inner.seed(seed);
    }

    fn reset<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        let observations = self.inner.reset().map_err(to_py_err)?;
        observations_to_py(py, observations)
    }

    /// Accepts one int for a single-agent episode or a list with one int per agent.
    fn step<'py>(
        &mut self,
        py: Python<'py>,
        action: &Bound<'py, PyAny>,
    ) -> PyResult<(Bound<'py, PyAny>, Bound<'py, PyAny>, bool, Bound<'py, PyDict>)> {
        let directions = match action.extract::<i64>() {
            Ok(turn) => Directions::Single(turn),
            Err(_) => Directions::Multi(action.extract::<Vec<i64>>()?),
        };
        let outcome = self.inner.step(directions).map_err(to_py_err)?;
        let info = PyDict::new(py);
        info.set_item("step", outcome.info.step)?;
        info.set_item("elegans_remaining", outcome.info.elegans_remaining)?;
        Ok((
            observations_to_py(py, outcome.observations)?,
            rewards_to_py(py, outcome.rewards)?,
            outcome.done,
            info,
        ))
    }

    /// Pixel rows of the current frame, `None` before the first reset.
    fn render_frame(&self) -> Option<Vec<Vec<f32>>> {
        self.inner.render_frame().map(|frame| {
            frame
                .pixels
                .chunks(frame.width)
                .map(<[f32]>::to_vec)
                .collect()
        })
    }
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(validate_config_json, m)?)?;
    m.add_class::<PyElegansEnv>()?;
    Ok(())
}
