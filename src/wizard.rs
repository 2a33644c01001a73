//! Interactive setup flow
//!
//! ```text
//! INTRO -> METHOD_SELECT -> {AUTOMATIC | CUSTOM | TEMPLATE | SKIP}
//!       -> CONFIRM -> PERSIST -> CERT_GEN -> HTTPS_TOGGLE -> DONE
//! ```
//!
//! SKIP goes straight to CERT_GEN. Declining at CONFIRM ends the run with
//! nothing written.

use crate::catalog::{Audience, EndpointCatalog};
use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use crate::layout::DataDir;
use crate::probe::{ProbeReport, ProbeResult, Prober, Transport};
use crate::prompt::{self, Prompter};
use crate::store::{ConfigStore, FileStatus};
use crate::synth::{self, Template};
use crate::tls::CertificateIssuer;

const RULE: &str = "=============================================================";

/// Progress sidebar entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Intro,
    ConfigCreation,
    Confirm,
    Https,
    Done,
}

impl Step {
    const ALL: [Step; 5] = [
        Step::Intro,
        Step::ConfigCreation,
        Step::Confirm,
        Step::Https,
        Step::Done,
    ];

    fn label(&self) -> &'static str {
        match self {
            Step::Intro => "intro",
            Step::ConfigCreation => "config creation",
            Step::Confirm => "confirm prefs",
            Step::Https => "make https work",
            Step::Done => "done",
        }
    }
}

/// How the config gets built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Automatic,
    Custom,
    Template,
    Skip,
}

impl Method {
    /// Menu order; entry `i` is offered as choice `i + 1`
    const ALL: [Method; 4] = [
        Method::Automatic,
        Method::Custom,
        Method::Template,
        Method::Skip,
    ];

    fn menu_label(&self) -> &'static str {
        match self {
            Method::Skip => "skip this",
            other => other.label(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Method::Automatic => "automatic",
            Method::Custom => "custom",
            Method::Template => "template",
            Method::Skip => "skip",
        }
    }
}

/// How a wizard run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every step ran
    Completed,
    /// The operator rejected the config; nothing was written
    Declined,
    /// Automatic discovery found no working servers; nothing was written
    NoServers,
}

pub struct Wizard<T, P> {
    catalog: EndpointCatalog,
    prober: Prober<T>,
    data_dir: DataDir,
    store: ConfigStore,
    issuer: CertificateIssuer,
    prompter: P,
    initial_status: FileStatus,
}

impl<T: Transport, P: Prompter> Wizard<T, P> {
    pub fn new(catalog: EndpointCatalog, prober: Prober<T>, data_dir: DataDir, prompter: P) -> Self {
        let store = ConfigStore::new(data_dir.config_path());
        Self {
            catalog,
            prober,
            data_dir,
            store,
            issuer: CertificateIssuer::new(),
            prompter,
            initial_status: FileStatus::Unknown,
        }
    }

    /// Status of the config file as seen when the run started
    pub fn with_initial_status(mut self, status: FileStatus) -> Self {
        self.initial_status = status;
        self
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    /// Run the full setup flow
    pub fn run(&mut self) -> Result<Outcome> {
        self.intro()?;
        let method = self.select_method()?;
        tracing::info!(method = method.label(), "Setup method selected");

        if method != Method::Skip {
            let config = match self.build_config(method) {
                Ok(config) => config,
                Err(Error::NoServersAvailable) => {
                    self.prompter
                        .say("no servers are running currently, please try again later.");
                    return Ok(Outcome::NoServers);
                }
                Err(e) => return Err(e),
            };

            if !self.confirm(&config)? {
                tracing::info!("Config declined, nothing written");
                return Ok(Outcome::Declined);
            }
            self.store.persist(&config, self.initial_status)?;
        }

        regenerate_certificates(&mut self.prompter, &self.issuer, &self.data_dir)?;
        self.done()?;
        Ok(Outcome::Completed)
    }

    fn intro(&mut self) -> Result<()> {
        screen(
            &mut self.prompter,
            Step::Intro,
            &[
                "welcome to the setup wizard.",
                "this program will walk you through",
                "setting up your own redirection",
                "proxy server.",
                "-> press enter",
            ],
        );
        self.prompter.ask("")?;
        Ok(())
    }

    fn select_method(&mut self) -> Result<Method> {
        let (body, numbers) = method_menu();
        let body: Vec<&str> = body.iter().map(String::as_str).collect();
        screen(&mut self.prompter, Step::ConfigCreation, &body);

        let options: Vec<&str> = numbers.iter().map(String::as_str).collect();
        let index = prompt::choose(&mut self.prompter, &options)?;
        Ok(Method::ALL[index])
    }

    fn build_config(&mut self, method: Method) -> Result<ProxyConfig> {
        self.prompter.say(&format!(
            "configuring proxy..\ncurrent config status: {}\nmethod: {}..",
            self.initial_status,
            method.label()
        ));
        match method {
            Method::Automatic => self.automatic(),
            Method::Custom => self.custom(),
            Method::Template => self.template(),
            Method::Skip => Err(Error::config("skip does not build a config")),
        }
    }

    fn automatic(&mut self) -> Result<ProxyConfig> {
        self.prompter.say("-- beginning tests");
        self.prompter
            .say(" 1. attempting to detect endpoints running on this machine");
        let local = self.probe_phase(Audience::Local)?;
        self.prompter
            .say(" 2. attempting to test endpoints on the official server");
        let official = self.probe_phase(Audience::Official)?;
        let report = ProbeReport { local, official };

        self.prompter.say("-- printing results of tests");
        for (heading, audience) in [("- local", Audience::Local), ("- official", Audience::Official)] {
            self.prompter.say(heading);
            for result in report.phase(audience) {
                let verdict = if result.reachable { "success" } else { "failure" };
                self.prompter
                    .say(&format!(" {}: {}", result.endpoint, verdict));
            }
        }

        self.prompter.say("-- generating config");
        let synthesis = synth::synthesize(&self.catalog, &report)?;
        self.prompter
            .say(&format!("using {} servers", synthesis.audience));
        self.prompter.say("\npress enter to continue...");
        self.prompter.ask("")?;
        Ok(synthesis.config)
    }

    fn probe_phase(&mut self, audience: Audience) -> Result<Vec<ProbeResult>> {
        let prompter = &mut self.prompter;
        self.prober
            .probe_phase_with(&self.catalog, audience, |entry, result| {
                let mark = if result.reachable { "✓" } else { "✗" };
                prompter.say(&format!(
                    "  {} {} -> {}",
                    mark,
                    entry.host(Audience::Display),
                    entry.host(audience)
                ));
            })
    }

    fn custom(&mut self) -> Result<ProxyConfig> {
        let mut pairs = Vec::new();
        loop {
            self.prompter.say(&format!(
                " you have {} redirection(s) already in\n press <Enter> on an empty line to stop",
                pairs.len()
            ));
            let from = self.prompter.ask("from: ")?;
            if from.is_empty() {
                break;
            }
            let to = self.prompter.ask("to: ")?;
            if to.is_empty() {
                break;
            }
            pairs.push((from, to));
        }
        Ok(synth::from_pairs(pairs))
    }

    fn template(&mut self) -> Result<ProxyConfig> {
        let templates = Template::all();
        let mut lines = vec!["-- please select a template".to_string()];
        lines.extend(
            templates
                .iter()
                .enumerate()
                .map(|(i, t)| format!(" {}. {}", i + 1, t.label())),
        );
        self.prompter.say(&lines.join("\n"));

        let numbers: Vec<String> = (1..=templates.len()).map(|i| i.to_string()).collect();
        let options: Vec<&str> = numbers.iter().map(String::as_str).collect();
        let template = templates[prompt::choose(&mut self.prompter, &options)?];
        tracing::info!(template = template.label(), "Template selected");
        Ok(template.render(&self.catalog))
    }

    fn confirm(&mut self, config: &ProxyConfig) -> Result<bool> {
        let json = config.to_pretty_json()?;
        screen(
            &mut self.prompter,
            Step::Confirm,
            &["are you okay with the settings below?"],
        );
        self.prompter.say(&format!("{}\n-> (y|n)", json.trim_end()));
        prompt::confirm(&mut self.prompter)
    }

    fn done(&mut self) -> Result<()> {
        screen(
            &mut self.prompter,
            Step::Done,
            &["congratulations, you are finished", "setting up!", "-> press enter"],
        );
        self.prompter.ask("")?;
        self.prompter
            .say("run this program again to use the new configuration");
        Ok(())
    }
}

/// METHOD_SELECT screen body and the answers it accepts, both built from
/// [`Method::ALL`]
fn method_menu() -> (Vec<String>, Vec<String>) {
    let numbers: Vec<String> = (1..=Method::ALL.len()).map(|i| i.to_string()).collect();
    let mut body = vec![
        "how would you like to configure the".to_string(),
        "proxy?".to_string(),
    ];
    body.extend(
        Method::ALL
            .iter()
            .zip(&numbers)
            .map(|(method, n)| format!("{}. {}", n, method.menu_label())),
    );
    body.push(format!("-> ({})", numbers.join("|")));
    (body, numbers)
}

/// CERT_GEN followed by HTTPS_TOGGLE
///
/// Replaces the certificate material in `data_dir`, then asks whether HTTPS
/// should be enabled and records the answer in the existing config. A
/// missing or invalid config aborts the HTTPS step.
pub fn regenerate_certificates<P: Prompter + ?Sized>(
    prompter: &mut P,
    issuer: &CertificateIssuer,
    data_dir: &DataDir,
) -> Result<()> {
    screen(
        prompter,
        Step::Https,
        &[
            "now, it is time to generate a https",
            "cert to encrypt your data",
            "-> press enter",
        ],
    );
    prompter.ask("")?;

    prompter.say("- generating certificate and key pair...");
    issuer.issue(data_dir.root())?;
    prompter.say("certificate saved...\nkeypair saved...");
    prompter.say("finished generating the cert and key pair...\npress enter to continue...");
    prompter.ask("")?;

    prompter.say("would you like to enable https on the server?\n-> (y|n)");
    let enable = prompt::confirm(prompter)?;
    let store = ConfigStore::new(data_dir.config_path());
    store.set_https(enable)?;
    tracing::info!(https = enable, "HTTPS flag recorded");

    prompter.say("finished modifying the config...\npress enter to continue...");
    prompter.ask("")?;
    Ok(())
}

/// Banner with the body on the left and step progress on the right
fn screen<P: Prompter + ?Sized>(prompter: &mut P, current: Step, body: &[&str]) {
    let mut out = vec![
        "== redirector -> setup ======================================".to_string(),
        format!("{:<40}Steps:", ""),
    ];
    let rows = body.len().max(Step::ALL.len());
    for i in 0..rows {
        let left = body.get(i).copied().unwrap_or("");
        let right = Step::ALL
            .get(i)
            .map(|s| {
                let marker = if *s == current { ">" } else { " " };
                format!("{} {}", marker, s.label())
            })
            .unwrap_or_default();
        out.push(format!(" {:<39}{}", left, right).trim_end().to_string());
    }
    out.push(RULE.to_string());
    prompter.say(&out.join("\n"));
}
