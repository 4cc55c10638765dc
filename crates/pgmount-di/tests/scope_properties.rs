//! Property-based tests for scope resolution
//!
//! Uses proptest to verify invariants of the scope:
//! 1. Argument order - factories see dependencies exactly in `inject` order
//! 2. Scope isolation - independently built scopes never share instances

use pgmount_di::{DependencyKey, DiError, Module, Provider, Scope};
use proptest::prelude::*;
use std::sync::Arc;

fn value_key(index: usize) -> DependencyKey {
	DependencyKey::named(format!("value-{}", index))
}

// Property 1: Argument order
// Any permutation of the inject list is reflected in the arguments the factory sees
proptest! {
	#[test]
	fn prop_factory_arguments_follow_inject_order(
		order in Just((0..6usize).collect::<Vec<_>>()).prop_shuffle()
	) {
		let rt = tokio::runtime::Runtime::new().unwrap();
		let seen = rt.block_on(async {
			let mut module = Module::new("prop");
			for i in 0..6 {
				module = module.provider(Provider::value(value_key(i), i));
			}
			let inject: Vec<_> = order.iter().copied().map(value_key).collect();
			module = module.provider(Provider::from_fn(
				DependencyKey::named("collected"),
				inject,
				|deps| {
					(0..deps.len())
						.map(|i| deps.get::<usize>(i).map(|v| *v))
						.collect::<Result<Vec<_>, DiError>>()
				},
			));

			let scope = Scope::build(&module).unwrap();
			scope
				.get::<Vec<usize>>(&DependencyKey::named("collected"))
				.await
				.unwrap()
		});

		prop_assert_eq!(&*seen, &order);
	}
}

// Property 2: Scope isolation
// N scopes from one module produce N distinct instances of every provider
proptest! {
	#[test]
	fn prop_scopes_share_no_instances(scope_count in 2usize..6) {
		let rt = tokio::runtime::Runtime::new().unwrap();
		rt.block_on(async {
			let module = Module::new("isolation")
				.provider(Provider::value(DependencyKey::named("config"), vec![1u8, 2, 3]));
			let scopes: Vec<_> = (0..scope_count)
				.map(|_| Scope::build(&module).unwrap())
				.collect();

			let mut instances = Vec::new();
			for scope in &scopes {
				instances.push(
					scope
						.get::<Vec<u8>>(&DependencyKey::named("config"))
						.await
						.unwrap(),
				);
			}

			for (i, a) in instances.iter().enumerate() {
				for b in instances.iter().skip(i + 1) {
					assert!(!Arc::ptr_eq(a, b));
					assert_eq!(a, b);
				}
			}
		});
	}
}
