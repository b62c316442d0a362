//! Parsing of nmap `-oX` output into [`HostReport`]s.
//!
//! Only the elements the result schema needs are read: host address and
//! state, the port table with service detection, ranked OS matches, and
//! script output. Unknown elements and attributes are ignored so newer
//! nmap versions do not break parsing.

use roxmltree::{Document, Node};

use super::executor::ScanError;
use crate::report::{HostReport, OsMatchReport, PortReport, ScriptReport, ServiceReport};

/// Parse a complete nmap XML document into per-host reports.
pub fn parse_report(xml: &str) -> Result<Vec<HostReport>, ScanError> {
    let doc = Document::parse(xml).map_err(|e| ScanError::Parse(e.to_string()))?;
    let root = doc.root_element();
    if !root.has_tag_name("nmaprun") {
        return Err(ScanError::Parse(format!(
            "expected <nmaprun> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    root.children()
        .filter(|n| n.has_tag_name("host"))
        .map(parse_host)
        .collect()
}

fn parse_host(node: Node) -> Result<HostReport, ScanError> {
    let address = node
        .children()
        .find(|n| n.has_tag_name("address"))
        .and_then(|n| n.attribute("addr"))
        .ok_or_else(|| ScanError::Parse("host entry without address".to_string()))?
        .to_string();

    let state = node
        .children()
        .find(|n| n.has_tag_name("status"))
        .and_then(|n| n.attribute("state"))
        .unwrap_or("unknown")
        .to_string();

    let ports = match node.children().find(|n| n.has_tag_name("ports")) {
        Some(ports_node) => ports_node
            .children()
            .filter(|n| n.has_tag_name("port"))
            .map(parse_port)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let os_matches = match node.children().find(|n| n.has_tag_name("os")) {
        Some(os_node) => os_node
            .children()
            .filter(|n| n.has_tag_name("osmatch"))
            .map(parse_os_match)
            .collect(),
        None => Vec::new(),
    };

    let host_scripts = match node.children().find(|n| n.has_tag_name("hostscript")) {
        Some(hs) => hs
            .children()
            .filter(|n| n.has_tag_name("script"))
            .map(parse_script)
            .collect(),
        None => Vec::new(),
    };

    Ok(HostReport {
        address,
        state,
        ports,
        os_matches,
        host_scripts,
    })
}

fn parse_port(node: Node) -> Result<PortReport, ScanError> {
    let port = node
        .attribute("portid")
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| ScanError::Parse("port entry without numeric portid".to_string()))?;

    let protocol = node.attribute("protocol").unwrap_or("tcp").to_string();

    let state = node
        .children()
        .find(|n| n.has_tag_name("state"))
        .and_then(|n| n.attribute("state"))
        .unwrap_or("unknown")
        .to_string();

    let service = node
        .children()
        .find(|n| n.has_tag_name("service"))
        .map(|s| ServiceReport {
            name: s.attribute("name").unwrap_or("unknown").to_string(),
            product: s.attribute("product").map(str::to_string),
            version: s.attribute("version").map(str::to_string),
        });

    let scripts = node
        .children()
        .filter(|n| n.has_tag_name("script"))
        .map(parse_script)
        .collect();

    Ok(PortReport {
        protocol,
        port,
        state,
        service,
        scripts,
    })
}

fn parse_os_match(node: Node) -> OsMatchReport {
    OsMatchReport {
        name: node.attribute("name").unwrap_or("unknown").to_string(),
        accuracy: node
            .attribute("accuracy")
            .and_then(|a| a.parse().ok())
            .unwrap_or(0),
        os_type: node
            .children()
            .find(|n| n.has_tag_name("osclass"))
            .and_then(|c| c.attribute("type"))
            .map(str::to_string),
    }
}

fn parse_script(node: Node) -> ScriptReport {
    ScriptReport {
        id: node.attribute("id").unwrap_or("unknown").to_string(),
        output: node.attribute("output").unwrap_or_default().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap" args="nmap -oX - -sS 10.0.0.5" version="7.94">
  <host starttime="1" endtime="2">
    <status state="up" reason="user-set"/>
    <address addr="10.0.0.5" addrtype="ipv4"/>
    <ports>
      <port protocol="tcp" portid="22">
        <state state="open" reason="syn-ack"/>
        <service name="ssh" product="OpenSSH" version="9.6p1" method="probed"/>
      </port>
      <port protocol="tcp" portid="80">
        <state state="open" reason="syn-ack"/>
        <service name="http" product="nginx" version="1.24.0" method="probed"/>
        <script id="http-vuln-cve2021-41773" output="NOT VULNERABLE"/>
      </port>
      <port protocol="tcp" portid="443">
        <state state="filtered" reason="no-response"/>
      </port>
    </ports>
    <os>
      <osmatch name="Linux 5.X" accuracy="96">
        <osclass type="general purpose" vendor="Linux" accuracy="96"/>
      </osmatch>
      <osmatch name="Linux 4.X" accuracy="91"/>
    </os>
    <hostscript>
      <script id="smb-vuln-ms17-010" output="VULNERABLE: remote code execution"/>
    </hostscript>
  </host>
</nmaprun>
"#;

    #[test]
    fn parses_host_address_and_state() {
        let hosts = parse_report(SAMPLE).unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].address, "10.0.0.5");
        assert_eq!(hosts[0].state, "up");
    }

    #[test]
    fn parses_ports_with_states_and_services() {
        let hosts = parse_report(SAMPLE).unwrap();
        let ports = &hosts[0].ports;
        assert_eq!(ports.len(), 3);

        assert_eq!(ports[0].port, 22);
        assert_eq!(ports[0].state, "open");
        let ssh = ports[0].service.as_ref().unwrap();
        assert_eq!(ssh.name, "ssh");
        assert_eq!(ssh.product.as_deref(), Some("OpenSSH"));
        assert_eq!(ssh.version.as_deref(), Some("9.6p1"));

        assert_eq!(ports[2].port, 443);
        assert_eq!(ports[2].state, "filtered");
        assert!(ports[2].service.is_none());
    }

    #[test]
    fn parses_port_level_scripts() {
        let hosts = parse_report(SAMPLE).unwrap();
        let http = &hosts[0].ports[1];
        assert_eq!(http.scripts.len(), 1);
        assert_eq!(http.scripts[0].id, "http-vuln-cve2021-41773");
    }

    #[test]
    fn parses_ranked_os_matches() {
        let hosts = parse_report(SAMPLE).unwrap();
        let matches = &hosts[0].os_matches;
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].name, "Linux 5.X");
        assert_eq!(matches[0].accuracy, 96);
        assert_eq!(matches[0].os_type.as_deref(), Some("general purpose"));
        assert_eq!(matches[1].os_type, None);
    }

    #[test]
    fn parses_host_scripts() {
        let hosts = parse_report(SAMPLE).unwrap();
        let scripts = &hosts[0].host_scripts;
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].id, "smb-vuln-ms17-010");
        assert!(scripts[0].output.starts_with("VULNERABLE"));
    }

    #[test]
    fn empty_run_yields_no_hosts() {
        let xml = r#"<nmaprun scanner="nmap"></nmaprun>"#;
        assert!(parse_report(xml).unwrap().is_empty());
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        assert!(matches!(
            parse_report("<nmaprun><host>"),
            Err(ScanError::Parse(_))
        ));
        assert!(matches!(
            parse_report("<somethingelse/>"),
            Err(ScanError::Parse(_))
        ));
    }

    #[test]
    fn host_without_address_is_a_parse_error() {
        let xml = r#"<nmaprun><host><status state="up"/></host></nmaprun>"#;
        assert!(matches!(parse_report(xml), Err(ScanError::Parse(_))));
    }
}
