pub use crate::agent::{Agent, AgentId, HealthStatus};
pub use crate::batch::{run_batch, BatchResult, BatchSummaryRow};
pub use crate::data_collector::{DailyRecord, DataCollector, StatusCounts};
pub use crate::environment::Environment;
pub use crate::error::SeirvError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::parameters::{load_parameters, Parameters, ParametersBuilder};
pub use crate::random::{RngId, RngStreams};
pub use crate::report::{Report, ReportOptions, ReportWriter};
pub use crate::simulation::Simulation;
pub use crate::{assert_almost_eq, define_report, define_rng};
