//! Connection resolution: deciding, for every kernel argument, whether
//! it is bound to the host, to a peer kernel, or disabled.

use std::collections::{BTreeMap, HashMap};

use crate::args::kernel_args;
use crate::model::{Binding, Direction, Endpoint, KernelOptions, Operation};

/// Connection index built by the loader: one entry per connection,
/// keyed by the `in` endpoint. Ordered so the by-value scan below is
/// reproducible across runs.
pub type ConnectionIndex = BTreeMap<Endpoint, Endpoint>;

/// Resolve a binding for every argument of a kernel, in canonical
/// argument order.
///
/// The lookup direction differs per argument direction and both must be
/// preserved exactly: a connection is stored `in -> out`, inputs search
/// the index by value and bind to the matching key, outputs search by
/// key and bind to the value. The by-value scan is linear on purpose;
/// it runs once per argument at model-build time.
pub fn resolve_bindings(
    connections: &ConnectionIndex,
    user_name: &str,
    op: Operation,
    options: &KernelOptions,
) -> HashMap<String, Binding> {
    let mut bindings = HashMap::new();

    for arg in kernel_args(op) {
        let binding = if options.is_disabled(arg.name) {
            Binding::Disabled
        } else {
            match arg.direction {
                Direction::Input => connections
                    .iter()
                    .find(|(_, out)| out.kernel == user_name && out.parameter == arg.name)
                    .map(|(key, _)| Binding::Peer {
                        kernel: key.kernel.clone(),
                        parameter: key.parameter.clone(),
                    })
                    .unwrap_or(Binding::Host),
                Direction::Output => {
                    let key = Endpoint {
                        kernel: user_name.to_string(),
                        parameter: arg.name.to_string(),
                    };
                    connections
                        .get(&key)
                        .map(|out| Binding::Peer {
                            kernel: out.kernel.clone(),
                            parameter: out.parameter.clone(),
                        })
                        .unwrap_or(Binding::Host)
                }
            }
        };

        bindings.insert(arg.name.to_string(), binding);
    }

    bindings
}
