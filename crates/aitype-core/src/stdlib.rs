//! Standard-library scope
//!
//! Everything a host runtime exposes before user code runs. The scope is built
//! once and shared read-only between checks.

use crate::typechecker::Scope;
use crate::types::{primitives, Type};
use std::sync::OnceLock;
use tracing::debug;

static STD_SCOPE: OnceLock<Scope> = OnceLock::new();

/// The shared standard scope
pub fn std_scope() -> &'static Scope {
    STD_SCOPE.get_or_init(build_std_scope)
}

/// Build a fresh standard scope that the caller may extend
pub fn build_std_scope() -> Scope {
    let mut scope = Scope::new();

    for name in primitives::ALL {
        scope.set_type(name, Type::primitive(name));
    }

    let num = Type::num;
    let str = Type::str;
    let bool = Type::bool;
    let any = Type::any;

    let fns: Vec<(&str, Type)> = vec![
        // Core
        ("Core:v", str()),
        ("Core:ai", str()),
        ("Core:add", Type::signature([num(), num()], num())),
        ("Core:sub", Type::signature([num(), num()], num())),
        ("Core:mul", Type::signature([num(), num()], num())),
        ("Core:div", Type::signature([num(), num()], num())),
        ("Core:pow", Type::signature([num(), num()], num())),
        ("Core:mod", Type::signature([num(), num()], num())),
        ("Core:eq", Type::signature([any(), any()], bool())),
        ("Core:neq", Type::signature([any(), any()], bool())),
        ("Core:and", Type::signature([bool(), bool()], bool())),
        ("Core:or", Type::signature([bool(), bool()], bool())),
        ("Core:not", Type::signature([bool()], bool())),
        ("Core:gt", Type::signature([num(), num()], bool())),
        ("Core:lt", Type::signature([num(), num()], bool())),
        ("Core:gteq", Type::signature([num(), num()], bool())),
        ("Core:lteq", Type::signature([num(), num()], bool())),
        ("Core:type", Type::signature([any()], str())),
        ("Core:to_str", Type::signature([any()], str())),
        ("Core:range", Type::signature([num(), num()], Type::arr())),
        ("Core:sleep", Type::signature([num()], Type::null())),
        // Util
        ("Util:uuid", Type::signature([], str())),
        // Json
        ("Json:stringify", Type::signature([any()], str())),
        ("Json:parse", Type::signature([str()], any())),
        ("Json:parsable", Type::signature([str()], bool())),
        // Date
        ("Date:now", Type::signature([], num())),
        ("Date:year", Type::variadic(num())),
        ("Date:month", Type::variadic(num())),
        ("Date:day", Type::variadic(num())),
        ("Date:hour", Type::variadic(num())),
        ("Date:minute", Type::variadic(num())),
        ("Date:second", Type::variadic(num())),
        ("Date:parse", Type::signature([str()], num())),
        // Math
        ("Math:Infinity", num()),
        ("Math:E", num()),
        ("Math:LN2", num()),
        ("Math:LN10", num()),
        ("Math:LOG2E", num()),
        ("Math:LOG10E", num()),
        ("Math:PI", num()),
        ("Math:SQRT1_2", num()),
        ("Math:SQRT2", num()),
        ("Math:abs", Type::signature([num()], num())),
        ("Math:ceil", Type::signature([num()], num())),
        ("Math:floor", Type::signature([num()], num())),
        ("Math:round", Type::signature([num()], num())),
        ("Math:sign", Type::signature([num()], num())),
        ("Math:sqrt", Type::signature([num()], num())),
        ("Math:cbrt", Type::signature([num()], num())),
        ("Math:exp", Type::signature([num()], num())),
        ("Math:log", Type::signature([num()], num())),
        ("Math:log2", Type::signature([num()], num())),
        ("Math:log10", Type::signature([num()], num())),
        ("Math:sin", Type::signature([num()], num())),
        ("Math:cos", Type::signature([num()], num())),
        ("Math:tan", Type::signature([num()], num())),
        ("Math:atan2", Type::signature([num(), num()], num())),
        ("Math:hypot", Type::variadic(num())),
        ("Math:max", Type::signature([num(), num()], num())),
        ("Math:min", Type::signature([num(), num()], num())),
        ("Math:rnd", Type::variadic(num())),
        ("Math:gen_rng", Type::signature([any()], Type::variadic(num()))),
        // Num
        ("Num:from_hex", Type::signature([str()], num())),
        // Str
        ("Str:lf", str()),
        ("Str:lt", Type::signature([str(), str()], bool())),
        ("Str:gt", Type::signature([str(), str()], bool())),
        ("Str:from_codepoint", Type::signature([num()], str())),
        // Obj
        ("Obj:keys", Type::signature([Type::obj()], Type::arr())),
        ("Obj:vals", Type::signature([Type::obj()], Type::arr())),
        ("Obj:kvs", Type::signature([Type::obj()], Type::arr())),
        ("Obj:get", Type::signature([Type::obj(), str()], any())),
        ("Obj:set", Type::signature([Type::obj(), str(), any()], Type::null())),
        ("Obj:has", Type::signature([Type::obj(), str()], bool())),
        ("Obj:copy", Type::signature([Type::obj()], Type::obj())),
        ("Obj:merge", Type::signature([Type::obj(), Type::obj()], Type::obj())),
        // Arr
        ("Arr:create", Type::variadic(Type::arr())),
        // I/O
        ("print", Type::variadic(Type::null())),
        ("readline", Type::signature([str()], str())),
    ];

    for (name, typ) in fns {
        scope.set_variable(name, typ);
    }

    debug!(
        variables = scope.variables().count(),
        types = scope.types().count(),
        "built standard scope"
    );
    scope
}
