use crate::application::options::OptionsService;

#[derive(Clone)]
pub struct AdminState {
    pub options: OptionsService,
}
