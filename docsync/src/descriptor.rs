//! JVM-style descriptors for resolved types and member signatures.

use crate::resolve::ResolvedType;
use crate::syntax::Primitive;

const OBJECT: &str = "Ljava/lang/Object;";

impl Primitive {
    pub fn descriptor(self) -> char {
        match self {
            Primitive::Boolean => 'Z',
            Primitive::Byte => 'B',
            Primitive::Char => 'C',
            Primitive::Short => 'S',
            Primitive::Int => 'I',
            Primitive::Long => 'J',
            Primitive::Float => 'F',
            Primitive::Double => 'D',
        }
    }
}

/// Append the descriptor of `ty` to `out`.
pub fn encode_into(ty: &ResolvedType, out: &mut String) {
    match ty {
        ResolvedType::Primitive(p) => out.push(p.descriptor()),
        ResolvedType::Void => out.push('V'),
        ResolvedType::Class(class) => {
            out.push('L');
            if !class.package.is_empty() {
                out.push_str(&class.package.replace('.', "/"));
                out.push('/');
            }
            out.push_str(&class.binary);
            out.push(';');
        }
        ResolvedType::Array(component) => {
            out.push('[');
            encode_into(component, out);
        }
        ResolvedType::TypeVariable { bound, .. } => match bound {
            Some(bound) => encode_into(bound, out),
            None => out.push_str(OBJECT),
        },
    }
}

pub fn encode(ty: &ResolvedType) -> String {
    let mut out = String::new();
    encode_into(ty, &mut out);
    out
}

/// `(<params>)<ret>`
pub fn method(params: &[ResolvedType], ret: &ResolvedType) -> String {
    let mut out = String::from("(");
    for param in params {
        encode_into(param, &mut out);
    }
    out.push(')');
    encode_into(ret, &mut out);
    out
}

/// `(<params>)V`
pub fn constructor(params: &[ResolvedType]) -> String {
    method(params, &ResolvedType::Void)
}

/// `()<type>`
pub fn annotation_element(ty: &ResolvedType) -> String {
    method(&[], ty)
}
