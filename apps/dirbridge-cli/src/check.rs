use std::process::ExitCode;

use clap::Args;

use crate::common::CommonArgs;

#[derive(Args)]
pub struct CheckConfigArgs {
    /// Also require a usable service endpoint
    #[arg(long)]
    pub require_endpoint: bool,
}

impl CheckConfigArgs {
    pub fn run(&self, common: &CommonArgs) -> anyhow::Result<ExitCode> {
        let config = common.load_config()?;
        let endpoint = config.endpoint();

        if common.json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!("config:             {}", common.config.display());
            match &endpoint {
                Ok(endpoint) => println!("endpoint:           {endpoint}"),
                Err(e) => println!("endpoint:           <{e}>"),
            }
            println!("response_capacity:  {}", config.response_capacity);
            println!("connect_timeout:    {:?}", config.connect_timeout());
            println!("request_timeout:    {:?}", config.request_timeout());
            println!("allow_insecure_http: {}", config.allow_insecure_http);
            println!("home_base:          {}", config.passwd.home_base);
            println!("shell:              {}", config.passwd.shell);
        }

        if let Ok(endpoint) = &endpoint {
            if !endpoint.is_https() && !config.allow_insecure_http {
                tracing::warn!(%endpoint, "plain http endpoint will be refused; set allow_insecure_http");
            }
        }

        if self.require_endpoint {
            endpoint?;
        }
        Ok(ExitCode::SUCCESS)
    }
}
