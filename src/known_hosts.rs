//! Known-hosts reset script generation.
//!
//! Instances are frequently rebuilt with the same name or address, which
//! leaves stale keys in `~/.ssh/known_hosts`. The generated script removes
//! the entries for every inventory host, by address and by host name.

use shell_escape::unix::escape;

use crate::inventory::Inventory;

/// Interpreter line of the generated script.
pub const SHEBANG: &str = "#!/bin/sh";

/// Known-hosts file the script edits.
pub const KNOWN_HOSTS_FILE: &str = "\"$HOME/.ssh/known_hosts\"";

fn removal_line(target: &str) -> String {
    let escaped = escape(target.into());
    format!("ssh-keygen -f {KNOWN_HOSTS_FILE} -R {escaped}")
}

/// Qualifies `hostname` with `dns_domain` when one is configured.
#[must_use]
pub fn qualified_hostname(hostname: &str, dns_domain: Option<&str>) -> String {
    match dns_domain.map(|domain| domain.trim_matches('.')) {
        Some(domain) if !domain.is_empty() => format!("{hostname}.{domain}"),
        _ => hostname.to_owned(),
    }
}

/// Renders the reset script: the shebang followed by two removal commands
/// per host.
#[must_use]
pub fn render_reset_script(inventory: &Inventory, dns_domain: Option<&str>) -> String {
    let mut script = String::from(SHEBANG);
    script.push('\n');
    for host in inventory.all.hosts.values() {
        script.push_str(&removal_line(&host.address));
        script.push('\n');
        script.push_str(&removal_line(&qualified_hostname(&host.hostname, dns_domain)));
        script.push('\n');
    }
    script
}
