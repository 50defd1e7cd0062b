//! Collection replacement directives, keyed by `"<resource-type> <property>"`.
//!
//! A non-empty directive precedes a rendered collection (`members
//! replace-all-with \{ ... \}`). An empty directive means the property needs
//! no token when populated but must be cleared with `none` when empty.
//! Properties without an entry render bare when empty.

pub const REPLACE_ALL_WITH: &str = "replace-all-with";
pub const ADD: &str = "add";

static COLLECTION_POLICY: &[(&str, &str)] = &[
    ("gtm pool a members", REPLACE_ALL_WITH),
    ("gtm pool aaaa members", REPLACE_ALL_WITH),
    ("gtm pool cname members", REPLACE_ALL_WITH),
    ("gtm pool mx members", REPLACE_ALL_WITH),
    ("gtm server addresses", REPLACE_ALL_WITH),
    ("gtm server virtual-servers", REPLACE_ALL_WITH),
    ("gtm wideip a aliases", REPLACE_ALL_WITH),
    ("gtm wideip a pools", REPLACE_ALL_WITH),
    ("gtm wideip a rules", ""),
    ("gtm wideip aaaa aliases", REPLACE_ALL_WITH),
    ("gtm wideip aaaa pools", REPLACE_ALL_WITH),
    ("gtm wideip aaaa rules", ""),
    ("gtm wideip cname aliases", REPLACE_ALL_WITH),
    ("gtm wideip cname pools", REPLACE_ALL_WITH),
    ("gtm wideip mx aliases", REPLACE_ALL_WITH),
    ("gtm wideip mx pools", REPLACE_ALL_WITH),
    ("ltm data-group internal records", REPLACE_ALL_WITH),
    ("ltm node metadata", REPLACE_ALL_WITH),
    ("ltm policy actions", ""),
    ("ltm policy conditions", ""),
    ("ltm policy controls", REPLACE_ALL_WITH),
    ("ltm policy requires", REPLACE_ALL_WITH),
    ("ltm policy rules", ""),
    ("ltm pool members", REPLACE_ALL_WITH),
    ("ltm pool metadata", REPLACE_ALL_WITH),
    ("ltm snatpool members", REPLACE_ALL_WITH),
    ("ltm virtual clone-pools", REPLACE_ALL_WITH),
    ("ltm virtual metadata", REPLACE_ALL_WITH),
    ("ltm virtual persist", REPLACE_ALL_WITH),
    ("ltm virtual policies", REPLACE_ALL_WITH),
    ("ltm virtual profiles", REPLACE_ALL_WITH),
    ("ltm virtual rules", ""),
    ("ltm virtual security-log-profiles", REPLACE_ALL_WITH),
    ("ltm virtual vlans", REPLACE_ALL_WITH),
    ("ltm virtual-address metadata", REPLACE_ALL_WITH),
    ("net route-domain vlans", ADD),
    ("net vlan interfaces", REPLACE_ALL_WITH),
    ("pem policy rules", ""),
    ("security firewall address-list addresses", REPLACE_ALL_WITH),
    ("security firewall address-list fqdns", REPLACE_ALL_WITH),
    ("security firewall policy address-lists", REPLACE_ALL_WITH),
    ("security firewall policy port-lists", REPLACE_ALL_WITH),
    ("security firewall policy rules", ""),
    ("security firewall policy vlans", REPLACE_ALL_WITH),
    ("security firewall port-list ports", REPLACE_ALL_WITH),
    ("security firewall rule-list address-lists", REPLACE_ALL_WITH),
    ("security firewall rule-list port-lists", REPLACE_ALL_WITH),
    ("security firewall rule-list rules", ""),
    ("security firewall rule-list vlans", REPLACE_ALL_WITH),
    ("sys file ssl-cert cert-validation-options", REPLACE_ALL_WITH),
    ("sys file ssl-cert cert-validators", REPLACE_ALL_WITH),
    ("sys log-config publisher destinations", REPLACE_ALL_WITH),
];

/// Look up the directive for `property` of `resource_type`.
pub fn collection_directive(resource_type: &str, property: &str) -> Option<&'static str> {
    COLLECTION_POLICY
        .iter()
        .find(|(key, _)| {
            key.strip_prefix(resource_type)
                .and_then(|rest| rest.strip_prefix(' '))
                .is_some_and(|rest| rest == property)
        })
        .map(|(_, directive)| *directive)
}
