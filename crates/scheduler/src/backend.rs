use geosphere_kernel::{PhysicsParams, Planet};

/// Failure reported by an accelerator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AcceleratorError {
    #[error("accelerator device lost: {0}")]
    DeviceLost(String),
    #[error("accelerator does not support the {0} stage")]
    Unsupported(&'static str),
    #[error("accelerator failed: {0}")]
    Failed(String),
}

/// Offload target for the heavy whole-planet stages.
///
/// Each method must leave the planet in the same state the CPU kernel would,
/// or return an error; on error the stage is rerun on the CPU.
pub trait Accelerator {
    fn name(&self) -> &str;
    fn temperature(
        &mut self,
        planet: &mut Planet,
        dt: f64,
        params: &PhysicsParams,
    ) -> Result<(), AcceleratorError>;
    fn convection(
        &mut self,
        planet: &mut Planet,
        dt: f64,
        params: &PhysicsParams,
    ) -> Result<(), AcceleratorError>;
    fn advection(
        &mut self,
        planet: &mut Planet,
        dt: f64,
        params: &PhysicsParams,
    ) -> Result<(), AcceleratorError>;
}

/// Uninhabited accelerator for CPU-only backends.
#[derive(Debug)]
pub enum NoAccelerator {}

impl Accelerator for NoAccelerator {
    fn name(&self) -> &str {
        match *self {}
    }

    fn temperature(
        &mut self,
        _: &mut Planet,
        _: f64,
        _: &PhysicsParams,
    ) -> Result<(), AcceleratorError> {
        match *self {}
    }

    fn convection(
        &mut self,
        _: &mut Planet,
        _: f64,
        _: &PhysicsParams,
    ) -> Result<(), AcceleratorError> {
        match *self {}
    }

    fn advection(
        &mut self,
        _: &mut Planet,
        _: f64,
        _: &PhysicsParams,
    ) -> Result<(), AcceleratorError> {
        match *self {}
    }
}

/// Stages an accelerator may take over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceleratedStage {
    Temperature,
    Convection,
    Advection,
}

impl AcceleratedStage {
    pub fn name(self) -> &'static str {
        match self {
            AcceleratedStage::Temperature => "temperature",
            AcceleratedStage::Convection => "convection",
            AcceleratedStage::Advection => "advection",
        }
    }
}

/// Compute backend: an optional accelerator with permanent CPU fallback.
#[derive(Debug)]
pub struct Backend<A: Accelerator = NoAccelerator> {
    accelerator: Option<A>,
    fallback_reason: Option<AcceleratorError>,
}

impl Backend<NoAccelerator> {
    pub fn cpu() -> Self {
        Self {
            accelerator: None,
            fallback_reason: None,
        }
    }
}

impl Default for Backend<NoAccelerator> {
    fn default() -> Self {
        Self::cpu()
    }
}

impl<A: Accelerator> Backend<A> {
    pub fn with_accelerator(accelerator: A) -> Self {
        Self {
            accelerator: Some(accelerator),
            fallback_reason: None,
        }
    }

    pub fn is_accelerated(&self) -> bool {
        self.accelerator.is_some()
    }

    /// Name of the active accelerator, or `"cpu"`.
    pub fn name(&self) -> &str {
        self.accelerator.as_ref().map(|a| a.name()).unwrap_or("cpu")
    }

    /// The error that caused the fallback, if one happened.
    pub fn fallback_reason(&self) -> Option<&AcceleratorError> {
        self.fallback_reason.as_ref()
    }

    /// Try to run a stage on the accelerator. Returns `true` when it was
    /// handled; `false` means the caller must run the CPU kernel. The first
    /// failure drops the accelerator for good.
    pub fn try_run(
        &mut self,
        stage: AcceleratedStage,
        planet: &mut Planet,
        dt: f64,
        params: &PhysicsParams,
    ) -> bool {
        let Some(accelerator) = self.accelerator.as_mut() else {
            return false;
        };
        let result = match stage {
            AcceleratedStage::Temperature => accelerator.temperature(planet, dt, params),
            AcceleratedStage::Convection => accelerator.convection(planet, dt, params),
            AcceleratedStage::Advection => accelerator.advection(planet, dt, params),
        };
        match result {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(
                    backend = accelerator.name(),
                    stage = stage.name(),
                    %error,
                    "accelerator failed; falling back to CPU for the rest of the run"
                );
                self.accelerator = None;
                self.fallback_reason = Some(error);
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    /// Accelerator that counts calls and optionally fails on one stage.
    /// The counter is shared so it survives the accelerator being dropped.
    #[derive(Debug, Default)]
    pub struct ScriptedAccelerator {
        pub calls: Rc<Cell<usize>>,
        pub fail_on: Option<AcceleratedStage>,
    }

    impl ScriptedAccelerator {
        fn call(&mut self, stage: AcceleratedStage) -> Result<(), AcceleratorError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_on == Some(stage) {
                return Err(AcceleratorError::DeviceLost("scripted".into()));
            }
            Ok(())
        }
    }

    impl Accelerator for ScriptedAccelerator {
        fn name(&self) -> &str {
            "scripted"
        }

        fn temperature(
            &mut self,
            _: &mut Planet,
            _: f64,
            _: &PhysicsParams,
        ) -> Result<(), AcceleratorError> {
            self.call(AcceleratedStage::Temperature)
        }

        fn convection(
            &mut self,
            _: &mut Planet,
            _: f64,
            _: &PhysicsParams,
        ) -> Result<(), AcceleratorError> {
            self.call(AcceleratedStage::Convection)
        }

        fn advection(
            &mut self,
            _: &mut Planet,
            _: f64,
            _: &PhysicsParams,
        ) -> Result<(), AcceleratorError> {
            self.call(AcceleratedStage::Advection)
        }
    }
}
