use super::{Located, Props};
use crate::parse::ArmDeployment;
use crate::spans::Node;
use iacguard_state::azure::{Network, PortRange, SecurityGroup, SecurityGroupRule};
use iacguard_state::{Metadata, Value};

const GROUP: &str = "Microsoft.Network/networkSecurityGroups";
const RULE: &str = "Microsoft.Network/networkSecurityGroups/securityRules";

pub(super) fn adapt(deployment: &ArmDeployment, resources: &[Located<'_>]) -> Network {
    let security_groups = resources
        .iter()
        .filter(|r| r.is(GROUP))
        .map(|group| {
            let props = Props::of(deployment, group.resource);

            let mut rules: Vec<SecurityGroupRule> = props
                .node(&["securityRules"])
                .map(Node::items)
                .unwrap_or_default()
                .iter()
                .map(|inline| {
                    let name = inline
                        .get("name")
                        .map(|n| deployment.display_name(n))
                        .unwrap_or_default();
                    let rule_props = inline
                        .get("properties")
                        .map(|p| Props::at(deployment, p))
                        .unwrap_or_else(|| Props::at(deployment, inline));
                    rule(name, &rule_props, Metadata::new(deployment.range_of(inline)))
                })
                .collect();

            rules.extend(
                resources
                    .iter()
                    .filter(|r| r.is(RULE) && r.belongs_to(&group.name))
                    .map(|r| {
                        let rule_props = Props::of(deployment, r.resource);
                        let metadata = rule_props.own_metadata();
                        rule(r.short_name().to_string(), &rule_props, metadata)
                    }),
            );

            SecurityGroup {
                metadata: props.own_metadata(),
                name: group.name.clone(),
                rules,
            }
        })
        .collect();
    Network { security_groups }
}

fn rule(
    name: String,
    props: &Props<'_>,
    metadata: Metadata,
) -> SecurityGroupRule {
    let direction = props.string(&["direction"], "Inbound");
    let access = props.string(&["access"], "Allow");

    let mut source_addresses = props.strings(&["sourceAddressPrefix"]);
    source_addresses.extend(props.strings(&["sourceAddressPrefixes"]));

    let mut ports = props.strings(&["destinationPortRange"]);
    ports.extend(props.strings(&["destinationPortRanges"]));
    let destination_ports = ports
        .iter()
        .filter_map(|p| port_range(&p.value, p.metadata.clone()))
        .collect();

    SecurityGroupRule {
        metadata,
        name,
        outbound: Value::new(
            direction.equals_ignore_case("Outbound"),
            direction.metadata.clone(),
        ),
        allow: Value::new(access.equals_ignore_case("Allow"), access.metadata.clone()),
        source_addresses,
        destination_ports,
    }
}

/// `*`, a single port, or `low-high`.
fn port_range(raw: &str, metadata: Metadata) -> Option<PortRange> {
    let raw = raw.trim();
    let (start, end): (i64, i64) = match raw {
        "*" => (0, 65535),
        _ => match raw.split_once('-') {
            Some((lo, hi)) => (lo.trim().parse().ok()?, hi.trim().parse().ok()?),
            None => {
                let port = raw.parse().ok()?;
                (port, port)
            }
        },
    };
    (start <= end).then_some(PortRange {
        metadata,
        start,
        end,
    })
}
