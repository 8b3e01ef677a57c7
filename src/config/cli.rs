//! config/cli.rs
//! Argumentos de línea de comandos. Pisan a las variables de entorno.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "outreach_crm")]
#[command(about = "CRM de outreach con envío automatizado de emails")]
#[command(version)]
pub struct Cli {
    /// Puerto HTTP (también se puede dar con PORT)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,
}

impl Cli {
    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }
}
