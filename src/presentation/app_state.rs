// Application state for HTTP handlers
use crate::application::calculator_service::CalculatorService;

#[derive(Clone)]
pub struct AppState {
    pub calculator_service: CalculatorService,
}
