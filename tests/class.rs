#[macro_use]
mod common;

#[cfg(test)]
mod class {
    tests! {
        print_class in class is OK
        "Dessert"
    }

    tests! {
        print_instance in class is OK
        "Dessert instance"
    }

    tests! {
        method in class is OK
        "hi"
    }

    tests! {
        method_arguments in class is OK
        "7"
    }

    tests! {
        undefined_property in class is ERR 70
        "Undefined property 'missing' [line 2]"
    }

    tests! {
        set_on_value in class is ERR 70
        "Only instances have fields [line 2]"
    }

    tests! {
        get_on_value in class is ERR 70
        "Only instances have properties [line 1]"
    }
}
