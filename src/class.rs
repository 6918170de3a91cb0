use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::error::{RuntimeError, Unwind};
use crate::function::Function;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::token::Token;

/// A class declaration brought to life. The class owns its method table and
/// an optional superclass, and doubles as the constructor when called.
#[derive(Clone)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<RefCell<Class>>>,
    pub methods: HashMap<String, Function>,
}

impl Class {
    pub fn new(
        name: String,
        superclass: Option<Rc<RefCell<Class>>>,
        methods: HashMap<String, Function>,
    ) -> Self {
        Class { name, superclass, methods }
    }

    /// Looks the method up on this class first and then walks up the
    /// inheritance chain.
    pub fn find_method(&self, name: &str) -> Option<Function> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        if let Some(superclass) = &self.superclass {
            return superclass.borrow().find_method(name);
        }

        None
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Calling a class constructs an instance. The shared handle implements the
/// trait so that the new instance can point back at its class.
impl Callable for Rc<RefCell<Class>> {
    fn call(&self, interpreter: &mut Interpreter<'_>, arguments: Vec<Object>) -> Result<Object, Unwind> {
        let instance = Object::from(Instance::from(self));

        if let Some(initializer) = self.borrow().find_method("init") {
            initializer.bind(&instance).call(interpreter, arguments)?;
        }

        Ok(instance)
    }

    fn arity(&self) -> usize {
        match self.borrow().find_method("init") {
            Some(initializer) => initializer.arity(),
            None => 0,
        }
    }
}

/// An instance of a class: a reference to the class for method lookups and
/// a mutable bag of fields.
#[derive(Clone)]
pub struct Instance {
    pub class: Rc<RefCell<Class>>,
    fields: HashMap<String, Object>,
}

impl Instance {
    /// Resolves a property: fields win over methods, and methods come back
    /// bound to the accessed instance.
    pub fn get(&self, name: &Token, instance: &Object) -> Result<Object, RuntimeError> {
        if let Some(field) = self.fields.get(&name.lexeme) {
            return Ok(field.clone());
        }

        if let Some(method) = self.class.borrow().find_method(&name.lexeme) {
            return Ok(Object::from(method.bind(instance)));
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined property '{}'", name.lexeme),
        })
    }

    /// Defines or overwrites a field. Unlike variables, fields spring into
    /// existence on first assignment.
    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl From<&Rc<RefCell<Class>>> for Instance {
    fn from(class: &Rc<RefCell<Class>>) -> Self {
        Instance { class: Rc::clone(class), fields: HashMap::new() }
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<instance {}>", self.class.borrow().name)
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} instance", self.class.borrow().name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn class(name: &str, superclass: Option<Rc<RefCell<Class>>>) -> Rc<RefCell<Class>> {
        Rc::new(RefCell::new(Class::new(name.to_string(), superclass, HashMap::new())))
    }

    #[test]
    fn display_uses_the_bare_name() {
        let class = class("Point", None);
        assert_eq!(class.borrow().to_string(), "Point");
    }

    #[test]
    fn instance_display_names_the_class() {
        let class = class("Point", None);
        let instance = Instance::from(&class);
        assert_eq!(instance.to_string(), "Point instance");
    }

    #[test]
    fn fields_win_over_missing_properties() {
        let class = class("Point", None);
        let instance = Rc::new(RefCell::new(Instance::from(&class)));
        let object = Object::from(Rc::clone(&instance));

        let error = instance.borrow().get(&Token::from("x"), &object).unwrap_err();
        assert_eq!(error.message, "Undefined property 'x'");

        instance.borrow_mut().set(&Token::from("x"), Object::from(4.0));
        let value = instance.borrow().get(&Token::from("x"), &object).unwrap();
        assert_eq!(value, Object::from(4.0));
    }

    #[test]
    fn arity_defaults_to_zero_without_an_initializer() {
        let class = class("Point", None);
        assert_eq!(class.arity(), 0);
    }
}
