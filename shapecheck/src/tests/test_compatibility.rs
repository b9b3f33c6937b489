use crate::compatibility::{is_compatible, CompatibilityChecker};
use crate::tests::fixtures::WebApi;
use shapecheck_model::TypeModel;

#[test]
fn test_identical_types_are_compatible() {
    let mut api = WebApi::new();
    let list_of_cars = api.generic(api.list, &[api.car]);
    let cars = api.array_of(api.car);

    for ty in [api.car, api.int32, api.object, list_of_cars, cars] {
        assert!(
            is_compatible(&api.graph, ty, Some(ty)),
            "{} should accept itself",
            api.graph.full_name(ty)
        );
    }
}

#[test]
fn test_derived_type_satisfies_base() {
    let api = WebApi::new();
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(checker.is_compatible(api.auto, Some(api.car)));
    assert!(checker.is_compatible(api.object, Some(api.car)));
    assert!(!checker.is_compatible(api.car, Some(api.auto)));
}

#[test]
fn test_unrelated_types_are_incompatible() {
    let api = WebApi::new();
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(!checker.is_compatible(api.cat, Some(api.car)));
    assert!(!checker.is_compatible(api.car, Some(api.cat)));
    assert!(!checker.is_compatible(api.auto, Some(api.cat)));
}

#[test]
fn test_absent_actual_is_incompatible() {
    let api = WebApi::new();
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(!checker.is_compatible(api.car, None));
    assert!(!checker.is_compatible(api.object, None));
}

#[test]
fn test_value_and_reference_kinds_never_unify() {
    let api = WebApi::new();
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(!checker.is_compatible(api.car, Some(api.int32)));
    assert!(!checker.is_compatible(api.int32, Some(api.car)));
    // Int32 derives from Object, yet boxing is not considered
    assert!(!checker.is_compatible(api.object, Some(api.int32)));
    assert!(!checker.is_compatible(api.value_type, Some(api.int32)));
}

#[test]
fn test_contract_satisfied_by_implementation() {
    let mut api = WebApi::new();
    let ok_of_car = api.generic(api.ok, &[api.car]);
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(checker.is_compatible(api.action_result, Some(api.bad_request)));
    assert!(!checker.is_compatible(api.bad_request, Some(api.action_result)));
    // Generic actual against a non-generic contract
    assert!(!checker.is_compatible(api.action_result, Some(ok_of_car)));
}

#[test]
fn test_generic_and_non_generic_never_unify() {
    let mut api = WebApi::new();
    let list_of_cars = api.generic(api.list, &[api.car]);
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(!checker.is_compatible(api.object, Some(list_of_cars)));
    assert!(!checker.is_compatible(list_of_cars, Some(api.car)));
}

#[test]
fn test_list_satisfies_sequence_contracts() {
    let mut api = WebApi::new();
    let list_of_cars = api.generic(api.list, &[api.car]);
    let enumerable_of_cars = api.generic(api.enumerable, &[api.car]);
    let collection_of_autos = api.generic(api.collection, &[api.auto]);
    let enumerable_of_cats = api.generic(api.enumerable, &[api.cat]);
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(checker.is_compatible(enumerable_of_cars, Some(list_of_cars)));
    assert!(checker.is_compatible(collection_of_autos, Some(list_of_cars)));
    assert!(!checker.is_compatible(enumerable_of_cats, Some(list_of_cars)));
    assert!(!checker.is_compatible(list_of_cars, Some(enumerable_of_cars)));
}

#[test]
fn test_generic_arguments_are_checked_recursively() {
    let mut api = WebApi::new();
    let response_of_car = api.generic(api.custom_response, &[api.car]);
    let response_of_auto = api.generic(api.custom_response, &[api.auto]);
    let response_of_cat = api.generic(api.custom_response, &[api.cat]);
    let list_of_car_responses = api.generic(api.list, &[response_of_car]);
    let enumerable_of_auto_responses = api.generic(api.enumerable, &[response_of_auto]);
    let enumerable_of_cat_responses = api.generic(api.enumerable, &[response_of_cat]);
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(checker.is_compatible(response_of_auto, Some(response_of_car)));
    assert!(!checker.is_compatible(response_of_car, Some(response_of_auto)));
    assert!(!checker.is_compatible(response_of_cat, Some(response_of_car)));

    assert!(checker.is_compatible(enumerable_of_auto_responses, Some(list_of_car_responses)));
    assert!(!checker.is_compatible(enumerable_of_cat_responses, Some(list_of_car_responses)));
}

#[test]
fn test_every_argument_pair_must_pass() {
    let mut api = WebApi::new();
    let by_id = api.generic(api.dictionary, &[api.int32, api.car]);
    let by_id_autos = api.generic(api.dictionary, &[api.int32, api.auto]);
    let by_id_cats = api.generic(api.dictionary, &[api.int32, api.cat]);
    let by_car = api.generic(api.dictionary, &[api.car, api.car]);
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(checker.is_compatible(by_id_autos, Some(by_id)));
    assert!(!checker.is_compatible(by_id_cats, Some(by_id)));
    assert!(!checker.is_compatible(by_id, Some(by_car)));
}

#[test]
fn test_argument_counts_must_agree() {
    let mut api = WebApi::new();
    let by_id = api.generic(api.dictionary, &[api.int32, api.car]);
    let entry = api.generic(api.key_value_pair, &[api.int32, api.car]);
    let entries = api.generic(api.enumerable, &[entry]);
    let checker = CompatibilityChecker::new(&api.graph);

    // The outer contract matches, but one argument cannot pair with two
    assert!(!checker.is_compatible(entries, Some(by_id)));
}

#[test]
fn test_array_bridges_to_sequence_contract() {
    let mut api = WebApi::new();
    let cars = api.array_of(api.car);
    let enumerable_of_cars = api.generic(api.enumerable, &[api.car]);
    let enumerable_of_autos = api.generic(api.enumerable, &[api.auto]);
    let enumerable_of_cats = api.generic(api.enumerable, &[api.cat]);
    let list_contract_of_cars = api.generic(api.list_contract, &[api.car]);
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(checker.is_compatible(enumerable_of_cars, Some(cars)));
    assert!(checker.is_compatible(enumerable_of_autos, Some(cars)));
    assert!(checker.is_compatible(list_contract_of_cars, Some(cars)));
    assert!(!checker.is_compatible(enumerable_of_cats, Some(cars)));
}

#[test]
fn test_array_does_not_bridge_to_classes_or_multiple_arguments() {
    let mut api = WebApi::new();
    let cars = api.array_of(api.car);
    let list_of_cars = api.generic(api.list, &[api.car]);
    let by_id = api.generic(api.dictionary, &[api.int32, api.car]);
    let checker = CompatibilityChecker::new(&api.graph);

    // Arrays implement IList<T> but are not List<T>
    assert!(!checker.is_compatible(list_of_cars, Some(cars)));
    assert!(!checker.is_compatible(by_id, Some(cars)));
    assert!(!checker.is_compatible(api.car, Some(cars)));
}

#[test]
fn test_array_satisfies_its_non_generic_bases() {
    let mut api = WebApi::new();
    let cars = api.array_of(api.car);
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(checker.is_compatible(api.array, Some(cars)));
    assert!(checker.is_compatible(api.object, Some(cars)));
    assert!(!checker.is_compatible(api.value_type, Some(cars)));
}

#[test]
fn test_arrays_compare_element_wise() {
    let mut api = WebApi::new();
    let cars = api.array_of(api.car);
    let autos = api.array_of(api.auto);
    let cats = api.array_of(api.cat);
    let car_grid = api.graph.array_of(api.car, 2).unwrap();
    let list_of_cars = api.generic(api.list, &[api.car]);
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(checker.is_compatible(autos, Some(cars)));
    assert!(!checker.is_compatible(cars, Some(autos)));
    assert!(!checker.is_compatible(cats, Some(cars)));
    assert!(!checker.is_compatible(cars, Some(car_grid)));
    assert!(!checker.is_compatible(cars, Some(list_of_cars)));
}

#[test]
fn test_top_level_parameter_exit_is_accepted() {
    let api = WebApi::new();
    let parameter = api.graph.parameter(api.custom_response, 0).unwrap();
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(checker.exit_consistency(api.car, Some(parameter)));
    assert!(!checker.exit_consistency(api.car, None));
    assert!(!checker.exit_consistency(api.cat, Some(api.car)));
}

#[test]
fn test_nested_parameter_is_compared() {
    let mut api = WebApi::new();
    let parameter = api.graph.parameter(api.custom_response, 0).unwrap();
    let list_of_parameter = api.generic(api.list, &[parameter]);
    let list_of_cars = api.generic(api.list, &[api.car]);
    let checker = CompatibilityChecker::new(&api.graph);

    assert!(!checker.exit_consistency(list_of_cars, Some(list_of_parameter)));
}

/// Declared and returned types of typical controller actions
#[test]
fn test_controller_scenarios() {
    let mut api = WebApi::new();
    let list_of_cars = api.generic(api.list, &[api.car]);
    let enumerable_of_cars = api.generic(api.enumerable, &[api.car]);
    let enumerable_of_autos = api.generic(api.enumerable, &[api.auto]);
    let response_of_car = api.generic(api.custom_response, &[api.car]);
    let response_of_cat = api.generic(api.custom_response, &[api.cat]);
    let cars = api.array_of(api.car);
    let checker = CompatibilityChecker::new(&api.graph);

    let cases = [
        ("Car returns Car", api.car, api.car, true),
        ("Auto returns Car", api.auto, api.car, true),
        ("Cat returns Car", api.cat, api.car, false),
        ("IEnumerable<Car> returns List<Car>", enumerable_of_cars, list_of_cars, true),
        ("IEnumerable<Auto> returns List<Car>", enumerable_of_autos, list_of_cars, true),
        ("IEnumerable<Car> returns Car[]", enumerable_of_cars, cars, true),
        ("CustomResponse<Cat> returns CustomResponse<Car>", response_of_cat, response_of_car, false),
        ("Car returns List<Car>", api.car, list_of_cars, false),
    ];

    for (name, expected, actual, compatible) in cases {
        assert_eq!(
            checker.is_compatible(expected, Some(actual)),
            compatible,
            "{name}"
        );
    }
}
