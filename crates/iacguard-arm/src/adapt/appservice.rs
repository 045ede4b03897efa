use super::{Located, Props};
use crate::parse::ArmDeployment;
use iacguard_state::azure::{AppService, Service};

const SITE: &str = "Microsoft.Web/sites";

pub(super) fn adapt(deployment: &ArmDeployment, resources: &[Located<'_>]) -> AppService {
    let services = resources
        .iter()
        .filter(|r| r.is(SITE))
        .map(|r| {
            let props = Props::of(deployment, r.resource);
            Service {
                metadata: props.own_metadata(),
                name: r.name.clone(),
                https_only: props.bool(&["httpsOnly"], false),
                minimum_tls_version: props.string(&["siteConfig", "minTlsVersion"], "1.2"),
            }
        })
        .collect();
    AppService { services }
}
