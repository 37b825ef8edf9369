use dedication_studio;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging for development
    env_logger::init();

    // Run the dedication editor
    dedication_studio::run_app()
}
