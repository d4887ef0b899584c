use tracing_subscriber::EnvFilter;
use weave_di::controller;

mod app {
    use std::sync::Arc;

    use weave_di::{Component, Constructor, Export, Fill, Hook, Import, Priority, Slot};

    #[derive(Debug, Default)]
    pub struct Logger;
    impl Logger {
        pub fn log(&self, line: &str) {
            println!("[log] {line}");
        }
    }
    impl Component for Logger {
        fn constructor() -> Constructor<Self> {
            Constructor::default()
        }
    }

    #[derive(Debug)]
    pub struct Service {
        logger: Arc<Logger>,
    }
    impl Component for Service {
        fn constructor() -> Constructor<Self> {
            Constructor::new(|args| {
                Ok(Service {
                    logger: args.next()?,
                })
            })
            .param::<Logger>("logger")
        }

        fn hooks() -> Vec<Hook<Self>> {
            vec![Hook::infallible("start", |service: &Service| {
                service.logger.log("service started")
            })]
        }
    }

    #[derive(Debug)]
    pub struct Config {
        timeout: u64,
    }
    impl Component for Config {
        fn constructor() -> Constructor<Self> {
            Constructor::from_fn(|| Config { timeout: 30 })
        }

        fn exports() -> Vec<Export<Self>> {
            vec![Export::field("timeout", |config: &Config| config.timeout)]
        }
    }

    #[derive(Debug, Default)]
    pub struct Worker {
        logger: Slot<Logger>,
        timeout: Slot<u64>,
    }
    impl Component for Worker {
        fn constructor() -> Constructor<Self> {
            Constructor::default()
        }

        fn imports() -> Vec<Import<Self>> {
            vec![Import::field("logger", |worker: &Worker| &worker.logger)]
        }

        fn fills() -> Vec<Fill<Self>> {
            vec![Fill::field("timeout", |worker: &Worker| &worker.timeout)]
        }

        fn hooks() -> Vec<Hook<Self>> {
            vec![Hook::new("check", |worker: &Worker| {
                let timeout = worker.timeout.get().ok_or("no timeout was provided")?;
                if let Some(logger) = worker.logger.get() {
                    logger.log(&format!("worker ready, timeout {timeout}s"));
                }
                Ok(())
            })
            .priority(Priority::High)]
        }
    }

    weave_di::register_component!(Logger, Service, Config, Worker);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let location = concat!(module_path!(), "::app");
    let context = match controller::initialize(location) {
        Ok(context) => context,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };

    println!("{:?}", context);
    println!("{:?}", context.component::<app::Worker>());
}
