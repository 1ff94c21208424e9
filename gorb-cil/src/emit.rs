//! Textual `.il` rendering.

use crate::instr::{CilAssembly, CilType, Instr, Label, Method, MethodRef};
use std::fmt;

impl fmt::Display for CilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CilType::Int32 => "int32",
            CilType::Float32 => "float32",
            CilType::Bool => "bool",
            CilType::String => "string",
            CilType::Void => "void",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}::{}({})",
            self.return_type,
            self.owner,
            Name(&self.name),
            self.params.join(", ")
        )
    }
}

/// Words `ilasm` reserves. An identifier spelled like one must be quoted.
const RESERVED: &[&str] = &[
    "abstract", "add", "and", "ansi", "assembly", "auto", "beforefieldinit", "beq", "bge", "bgt",
    "ble", "blt", "bool", "box", "br", "break", "brfalse", "brinst", "brnull", "brtrue", "brzero",
    "bytearray", "call", "calli", "callvirt", "castclass", "ceq", "cgt", "char", "cil", "ckfinite",
    "class", "clt", "cpblk", "cpobj", "default", "div", "dup", "endfault", "endfilter",
    "endfinally", "explicit", "extends", "extern", "false", "family", "famandassem", "famorassem",
    "field", "final", "float32", "float64", "hidebysig", "implements", "initblk", "initobj",
    "instance", "int", "int16", "int32", "int64", "int8", "interface", "internalcall", "isinst",
    "jmp", "ldarg", "ldarga", "ldelem", "ldelema", "ldfld", "ldflda", "ldftn", "ldind", "ldlen",
    "ldloc", "ldloca", "ldnull", "ldobj", "ldsfld", "ldsflda", "ldstr", "ldtoken", "ldvirtftn",
    "leave", "literal", "localloc", "managed", "method", "mkrefany", "mul", "native", "neg",
    "newarr", "newobj", "nop", "not", "object", "or", "pinned", "pop", "private", "public",
    "refanytype", "refanyval", "rem", "ret", "rethrow", "sealed", "shl", "shr", "sizeof",
    "specialname", "starg", "static", "stelem", "stfld", "stind", "stloc", "stobj", "string",
    "stsfld", "sub", "switch", "throw", "true", "typedref", "uint", "uint16", "uint32", "uint64",
    "uint8", "unaligned", "unbox", "unsigned", "value", "valuetype", "vararg", "virtual", "void",
    "volatile", "xor",
];

/// A user identifier, quoted when `ilasm` would read it as a keyword.
struct Name<'a>(&'a str);

impl fmt::Display for Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if RESERVED.contains(&self.0) {
            write!(f, "'{}'", self.0)
        } else {
            f.write_str(self.0)
        }
    }
}

/// Escapes the characters `ldstr` reads as escape sequences.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::LdcI4(value) => write!(f, "ldc.i4 {}", value),
            Instr::LdcR4(value) => write!(f, "ldc.r4 {:?}", value),
            Instr::LdcBool(value) => write!(f, "ldc.i4.{}", *value as u8),
            Instr::Ldstr(value) => write!(f, "ldstr \"{}\"", escape(value)),
            Instr::Ldarg(name) => write!(f, "ldarg {}", Name(name)),
            Instr::Starg(name) => write!(f, "starg {}", Name(name)),
            Instr::Ldloc(name) => write!(f, "ldloc {}", Name(name)),
            Instr::Stloc(name) => write!(f, "stloc {}", Name(name)),
            Instr::Ldsfld { ty, name } => write!(f, "ldsfld {} Program::{}", ty, Name(name)),
            Instr::Stsfld { ty, name } => write!(f, "stsfld {} Program::{}", ty, Name(name)),
            Instr::Add => f.write_str("add"),
            Instr::Sub => f.write_str("sub"),
            Instr::Mul => f.write_str("mul"),
            Instr::Div => f.write_str("div"),
            Instr::Cgt => f.write_str("cgt"),
            Instr::Clt => f.write_str("clt"),
            Instr::Ceq => f.write_str("ceq"),
            Instr::And => f.write_str("and"),
            Instr::Or => f.write_str("or"),
            Instr::ConvR4 => f.write_str("conv.r4"),
            Instr::ConvR8 => f.write_str("conv.r8"),
            Instr::ConvI4 => f.write_str("conv.i4"),
            Instr::Box(ty) => write!(f, "box [mscorlib]System.{}", ty.box_name()),
            Instr::Call(method) => write!(f, "call {}", method),
            Instr::Br(label) => write!(f, "br {}", label),
            Instr::Brfalse(label) => write!(f, "brfalse {}", label),
            Instr::Label(label) => write!(f, "{}:", label),
            Instr::Pop => f.write_str("pop"),
            Instr::Ret => f.write_str("ret"),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_entry_point {
            writeln!(
                f,
                "  .method private hidebysig static void {}(string[] args) cil managed {{",
                self.name
            )?;
            writeln!(f, "    .entrypoint")?;
        } else {
            let params: Vec<String> = self
                .params
                .iter()
                .map(|(name, ty)| format!("{} {}", ty, Name(name)))
                .collect();
            writeln!(
                f,
                "  .method public hidebysig static {} {}({}) cil managed {{",
                self.return_type,
                Name(&self.name),
                params.join(", ")
            )?;
        }

        if !self.locals.is_empty() {
            writeln!(f, "    .locals init (")?;
            for (i, (name, ty)) in self.locals.iter().enumerate() {
                let separator = if i + 1 < self.locals.len() { "," } else { "" };
                writeln!(f, "      [{}] {} {}{}", i, ty, Name(name), separator)?;
            }
            writeln!(f, "    )")?;
        }

        for instr in &self.body {
            match instr {
                // labels start at column 0
                Instr::Label(_) => writeln!(f, "{}", instr)?,
                _ => writeln!(f, "    {}", instr)?,
            }
        }

        writeln!(f, "  }}")
    }
}

impl fmt::Display for CilAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".assembly extern mscorlib {{}}")?;
        writeln!(f, ".assembly {} {{}}", self.module)?;
        writeln!(f, ".module {}.exe", self.module)?;
        writeln!(f)?;
        writeln!(
            f,
            ".class private auto ansi beforefieldinit Program extends [mscorlib]System.Object {{"
        )?;

        for (name, ty) in &self.fields {
            writeln!(f, "  .field public static {} {}", ty, Name(name))?;
        }

        for method in self.methods.iter().chain(Some(&self.main)) {
            writeln!(f)?;
            write!(f, "{}", method)?;
        }

        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_instr_display() {
        assert_eq!(Instr::LdcR4(2.0).to_string(), "ldc.r4 2.0");
        assert_eq!(Instr::LdcR4(3.14).to_string(), "ldc.r4 3.14");
        assert_eq!(Instr::LdcBool(true).to_string(), "ldc.i4.1");
        assert_eq!(
            Instr::Ldstr("C:\\dir\tx".to_string()).to_string(),
            "ldstr \"C:\\\\dir\\tx\""
        );
        assert_eq!(Instr::Box(CilType::Float32).to_string(), "box [mscorlib]System.Single");
        assert_eq!(
            Instr::Call(MethodRef::mscorlib("string", "String", "Concat", &["object", "object"]))
                .to_string(),
            "call string [mscorlib]System.String::Concat(object, object)"
        );
        assert_eq!(
            Instr::Call(MethodRef::program(
                "area",
                CilType::Float32,
                &[CilType::Float32, CilType::Int32]
            ))
            .to_string(),
            "call float32 Program::area(float32, int32)"
        );
    }

    #[test]
    fn test_reserved_names_are_quoted() {
        assert_eq!(Instr::Ldloc("ret".to_string()).to_string(), "ldloc 'ret'");
        assert_eq!(Instr::Ldloc("ret$1".to_string()).to_string(), "ldloc ret$1");
        assert_eq!(
            Instr::Stsfld {
                ty: CilType::Int32,
                name: "add".to_string()
            }
            .to_string(),
            "stsfld int32 Program::'add'"
        );
        assert_eq!(
            Instr::Call(MethodRef::program("pop", CilType::Int32, &[])).to_string(),
            "call int32 Program::'pop'()"
        );

        let method = Method::new("sub", CilType::Int32, vec![("div".to_string(), CilType::Int32)]);
        assert!(method
            .to_string()
            .starts_with("  .method public hidebysig static int32 'sub'(int32 'div') cil managed {"));
    }

    #[test]
    fn test_method_display() {
        let mut method = Method::new(
            "twice",
            CilType::Int32,
            vec![("n".to_string(), CilType::Int32)],
        );
        method.locals.push(("r".to_string(), CilType::Int32));
        method.locals.push(("r$1".to_string(), CilType::String));
        method.body = vec![
            Instr::Ldarg("n".to_string()),
            Instr::LdcI4(2),
            Instr::Mul,
            Instr::Stloc("r".to_string()),
            Instr::Label(Label(1)),
            Instr::Ldloc("r".to_string()),
            Instr::Ret,
        ];
        assert_snapshot!(method.to_string(), @r###"
          .method public hidebysig static int32 twice(int32 n) cil managed {
            .locals init (
              [0] int32 r,
              [1] string r$1
            )
            ldarg n
            ldc.i4 2
            mul
            stloc r
        L1:
            ldloc r
            ret
          }
        "###);
    }
}
