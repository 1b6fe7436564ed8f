mod certificates;
mod templates;
mod clock;
mod renderer;

pub use certificates::CertificateSource;
pub use templates::TemplateDirectory;
pub use clock::Clock;
pub use renderer::Renderer;
