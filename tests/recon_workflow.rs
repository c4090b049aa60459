//! End-to-end recon workflow over the public API: toggle into monitor mode,
//! scan, store a credential, connect. Tool output is replayed by a fake
//! runner so no processes are spawned.

use std::sync::Mutex;

use dronejack::{
    Cmd, CommandRunner, ConnectWorkflow, InterfaceMode, ModeManager, ProcessOutcome, Result,
    ScanPipeline, TargetRegistry, ToolConfig, WifiError,
};

/// Replays canned stdout keyed on a prefix of the rendered command line;
/// same-prefix entries are consumed in order.
struct ReplayRunner {
    responses: Mutex<Vec<(&'static str, &'static str)>>,
}

impl ReplayRunner {
    fn new(responses: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            responses: Mutex::new(responses),
        }
    }
}

impl CommandRunner for ReplayRunner {
    fn run(&self, cmd: &Cmd) -> Result<ProcessOutcome> {
        let rendered = cmd.display();
        let mut responses = self.responses.lock().unwrap();
        let position = responses
            .iter()
            .position(|(prefix, _)| rendered.starts_with(prefix));
        match position {
            Some(idx) => {
                let (_, stdout) = responses.remove(idx);
                Ok(ProcessOutcome {
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                    exit_code: 0,
                    timed_out: false,
                })
            }
            None => Err(WifiError::LaunchFailed(format!(
                "unscripted command: {}",
                rendered
            ))),
        }
    }
}

const MANAGED: &str = "wlan0     IEEE 802.11  ESSID:off/any  Mode:Managed\n";
const MONITOR: &str = "wlan0mon  IEEE 802.11  Mode:Monitor  Frequency:2.437 GHz\n";
const START_OK: &str =
    "\t\t(mac80211 monitor mode vif enabled for [phy0]wlan0 on [phy0]wlan0mon)\n";
const RFKILL_CLEAR: &str = "0: phy0: Wireless LAN\n\tSoft blocked: no\n\tHard blocked: no\n";
const CAPTURE: &str = "Parrot-A1,aa:bb:cc:dd:ee:ff,6,-40,WPA2,CCMP,PSK\n\
                       Bebop-2,11:22:33:44:55:66,11,-70,WPA2,CCMP,PSK\n";

#[test]
fn toggle_scan_credential_connect() {
    let runner = ReplayRunner::new(vec![
        // toggle managed -> monitor
        ("iwconfig", MANAGED),
        ("airmon-ng stop wlan0", ""),
        ("airmon-ng check kill", ""),
        ("airmon-ng start wlan0", START_OK),
        ("iwconfig", MONITOR),
        ("rfkill list", RFKILL_CLEAR),
        ("iwconfig", MONITOR),
        // scan precondition check + capture
        ("iwconfig", MONITOR),
        ("apdump wlan0mon 60", CAPTURE),
        // connection attempt
        (
            "wpaconnect Parrot-A1 s3cr3t aa:bb:cc:dd:ee:ff",
            "CTRL-EVENT-CONNECTED - Connection to aa:bb:cc:dd:ee:ff completed\n",
        ),
    ]);
    let config = ToolConfig::default();
    let registry = TargetRegistry::new();

    let up = ModeManager::new(&runner, &config).toggle("wlan0").unwrap();
    assert_eq!(up.mode, InterfaceMode::Monitor);
    let monitor = up.monitor_name.expect("monitor interface name");
    assert_eq!(monitor, "wlan0mon");

    let targets = ScanPipeline::new(&runner, &config, &registry)
        .scan(&monitor, 60)
        .unwrap();
    assert_eq!(targets.len(), 2);
    assert_eq!(registry.known(), vec!["Parrot-A1", "Bebop-2"]);
    assert!(registry.credentialed().is_empty());

    registry.set_credential("Parrot-A1", "s3cr3t").unwrap();
    assert_eq!(registry.credentialed(), vec!["Parrot-A1"]);

    let connected = ConnectWorkflow::new(&runner, &config, &registry)
        .connect("Parrot-A1")
        .unwrap();
    assert!(connected);
}

#[test]
fn connect_without_credential_spawns_nothing() {
    // no scripted responses: any spawn attempt would fail loudly
    let runner = ReplayRunner::new(Vec::new());
    let config = ToolConfig::default();
    let registry = TargetRegistry::new();

    let err = ConnectWorkflow::new(&runner, &config, &registry)
        .connect("Parrot-A1")
        .unwrap_err();
    assert!(matches!(err, WifiError::MissingCredential(_)));
}
