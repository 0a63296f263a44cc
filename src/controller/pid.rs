/// PID (Proportional-Integral-Derivative) Controller
///
/// Calculates an error value as the difference between a desired setpoint and a
/// measured process variable, and applies a correction based on proportional,
/// integral, and derivative terms.
///
/// Output = Kp * error + Ki * ∫error*dt + Kd * d(error)/dt
#[derive(Debug, Clone)]
pub struct PidController {
    /// Proportional gain
    kp: f64,
    /// Integral gain
    ki: f64,
    /// Derivative gain
    kd: f64,

    /// Target setpoint
    setpoint: f64,

    /// Accumulated integral term
    integral: f64,
    /// Previous error for derivative calculation
    previous_error: Option<f64>,

    /// Integral windup limits
    integral_min: f64,
    integral_max: f64,

    /// Output limits
    output_min: f64,
    output_max: f64,
}

impl PidController {
    /// Create a new PID controller with default limits
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self::with_limits(
            kp,
            ki,
            kd,
            -1000.0,
            1000.0,
            f64::NEG_INFINITY,
            f64::INFINITY,
        )
    }

    /// Create a PID controller with custom limits
    pub fn with_limits(
        kp: f64,
        ki: f64,
        kd: f64,
        integral_min: f64,
        integral_max: f64,
        output_min: f64,
        output_max: f64,
    ) -> Self {
        Self {
            kp,
            ki,
            kd,
            setpoint: 0.0,
            integral: 0.0,
            previous_error: None,
            integral_min,
            integral_max,
            output_min,
            output_max,
        }
    }

    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Reset the controller state
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = None;
    }

    /// Calculate control output based on current process value
    ///
    /// # Arguments
    /// * `process_value` - Current measured value
    /// * `dt` - Time delta since last update, in steps
    pub fn update(&mut self, process_value: f64, dt: f64) -> f64 {
        let error = self.setpoint - process_value;

        let p_term = self.kp * error;

        // Integral term with anti-windup
        self.integral += error * dt;
        self.integral = self.integral.clamp(self.integral_min, self.integral_max);
        let i_term = self.ki * self.integral;

        // No derivative kick on the first update
        let d_term = match self.previous_error {
            Some(previous) if dt > 0.0 => self.kd * (error - previous) / dt,
            _ => 0.0,
        };

        self.previous_error = Some(error);

        (p_term + i_term + d_term).clamp(self.output_min, self.output_max)
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn previous_error(&self) -> Option<f64> {
        self.previous_error
    }
}
